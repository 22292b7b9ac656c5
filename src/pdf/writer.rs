use std::collections::HashMap;
use std::io::Write;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use crate::pdf::fonts::{FontFace, FontProgram, FontSet};
use crate::pdf::liner::{PdfPage, FONT_SIZE, PAGE_HEIGHT, PAGE_WIDTH};
use crate::pdf::{PdfError, PdfResult};

/// WinAnsi 编码，无法表示的字符写成 ?
pub fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

fn compress(data: &[u8]) -> PdfResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

// 等宽字体，32..255 的字宽都是 600
fn monospace_widths() -> Vec<Object> {
    vec![Object::Integer(600); 224]
}

fn add_font(doc: &mut Document, program: &FontProgram, face: FontFace) -> PdfResult<ObjectId> {
    let id = match program {
        FontProgram::Builtin(name) => doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(name.as_bytes().to_vec()),
            "Encoding" => "WinAnsiEncoding",
        }),
        FontProgram::Embedded { name, data } => {
            let file = Stream::new(
                dictionary! {
                    "Length1" => data.len() as i64,
                    "Filter" => "FlateDecode",
                },
                compress(data)?,
            );
            let file_id = doc.add_object(file);
            let italic_angle = if face == FontFace::Italic { -12 } else { 0 };
            // FixedPitch | Nonsymbolic
            let flags = 1 | 32;
            let descriptor_id = doc.add_object(dictionary! {
                "Type" => "FontDescriptor",
                "FontName" => Object::Name(name.as_bytes().to_vec()),
                "Flags" => flags,
                "FontBBox" => vec![(-56).into(), (-250).into(), 678.into(), 857.into()],
                "ItalicAngle" => italic_angle,
                "Ascent" => 857,
                "Descent" => -250,
                "CapHeight" => 600,
                "StemV" => if face == FontFace::Bold { 120 } else { 80 },
                "FontFile2" => file_id,
            });
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "TrueType",
                "BaseFont" => Object::Name(name.as_bytes().to_vec()),
                "FirstChar" => 32,
                "LastChar" => 255,
                "Widths" => monospace_widths(),
                "FontDescriptor" => descriptor_id,
                "Encoding" => "WinAnsiEncoding",
            })
        }
    };
    Ok(id)
}

fn page_content(page: &PdfPage) -> Content {
    let mut operations = Vec::with_capacity(page.draws.len() * 5);
    for draw in &page.draws {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![draw.face.resource_name().into(), FONT_SIZE.into()],
        ));
        operations.push(Operation::new("Td", vec![draw.x.into(), draw.y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(&draw.text), StringFormat::Literal)],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}

/// 构建 PDF 对象图
pub fn build_document(pages: &[PdfPage], fonts: &FontSet, title: Option<&str>) -> PdfResult<Document> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    // 相同的字体程序只写一次
    let mut font_ids: HashMap<FontFace, ObjectId> = HashMap::new();
    let mut written: Vec<(&FontProgram, ObjectId)> = Vec::new();
    for face in [FontFace::Regular, FontFace::Bold, FontFace::Italic] {
        let program = fonts.get(face);
        let id = match written.iter().find(|(p, _)| *p == program) {
            Some((_, id)) => *id,
            None => {
                let id = add_font(&mut doc, program, face)?;
                written.push((program, id));
                id
            }
        };
        font_ids.insert(face, id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FontFace::Regular.resource_name() => font_ids[&FontFace::Regular],
            FontFace::Bold.resource_name() => font_ids[&FontFace::Bold],
            FontFace::Italic.resource_name() => font_ids[&FontFace::Italic],
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let encoded = page_content(page)
            .encode()
            .map_err(|e| PdfError::Lopdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(
            dictionary! {"Filter" => "FlateDecode"},
            compress(&encoded)?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(to_win_ansi(title), StringFormat::Literal),
            "Producer" => Object::string_literal("screenwright"),
        });
        doc.trailer.set("Info", info_id);
    }
    Ok(doc)
}

/// 把排好版的页面写成 PDF 字节
pub fn write_pdf(pages: &[PdfPage], fonts: &FontSet, title: Option<&str>) -> PdfResult<Vec<u8>> {
    let mut doc = build_document(pages, fonts, title)?;
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfError::Lopdf(e.to_string()))?;
    Ok(bytes)
}
