pub mod models;
pub mod utils;
pub mod parser;
pub mod fountain;
pub mod fdx;
pub mod pdf;
pub mod markdown;
pub mod store;
pub mod workflow;
pub mod ai;
pub mod api;

pub use models::{
    Conf,
    Paragraph,
    ParagraphKind,
    Scene,
    Screenplay,
    ScreenplayPatch,
    StateId,
};

pub use parser::{
    parse,
    FountainParser,
    ParseOutput,
};

pub use fountain::{compile_fountain, make_slugline};

pub use fdx::{build_fdx, FdxError};

pub use pdf::{export_pdf, PdfError};

pub use store::{JsonFileStore, MemoryStore, ScreenplayStore, StoreError};

pub use workflow::{can_enter, GuardFailure, TransitionOutcome, WorkflowMachine};

pub use ai::{draft_scene, MockProposals, ProposalError, ProposalService};

pub use api::{
    ExportError,
    ExportFormat,
    ExportReport,
    export_bundle,
    export_pdf_base64,
    export_to_dir,
    parse_fountain_text,
};
