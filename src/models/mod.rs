pub mod paragraph;
pub mod scene;
pub mod turning_point;
pub mod characters;
pub mod subplot;
pub mod state;
pub mod screenplay;
pub mod conf;

pub use paragraph::{Paragraph, DialoguePart, ParagraphKind};
pub use scene::{Scene, SceneStatus, Heading, DayPart};
pub use turning_point::{TurningPoint, TurningPointType};
pub use characters::{
    Archetype, ArchetypeBeat, Character, JourneyPhase, RelationKind, Relationship, StructuralRole,
};
pub use subplot::{Subplot, SubplotBeat, SubplotType};
pub use state::StateId;
pub use screenplay::{MoveDirection, Screenplay, ScreenplayId, ScreenplayPatch, Treatment};
pub use conf::{Conf, FontFiles};
