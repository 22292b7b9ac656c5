use serde::Serialize;
use crate::pdf::fonts::FontFace;

/// 页面尺寸（US Letter，单位：磅）
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

/// 页边距
pub const MARGIN_LEFT: f32 = 108.0;
pub const MARGIN_RIGHT: f32 = 72.0;
pub const MARGIN_TOP: f32 = 72.0;
pub const MARGIN_BOTTOM: f32 = 72.0;

pub const FONT_SIZE: f32 = 12.0;
pub const LEADING: f32 = 14.0;

/// 正文列数
pub const COLS_BODY: usize = 65;
/// 对白列数
pub const COLS_DIALOGUE: usize = 36;
/// 括号提示列数
pub const COLS_PARENTHETICAL: usize = 24;

/// 各段落类型的缩进列
pub const INDENT_ACTION: usize = 0;
pub const INDENT_SLUG: usize = 0;
pub const INDENT_CHARACTER: usize = 22;
pub const INDENT_PARENTHETICAL: usize = 20;
pub const INDENT_DIALOGUE: usize = 16;

/// 等宽字体字宽与字号之比
const CHAR_WIDTH_RATIO: f32 = 0.6;

/// 列号 → x 坐标
pub fn col_to_x(col: usize) -> f32 {
    let col_width = (PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / COLS_BODY as f32;
    MARGIN_LEFT + col as f32 * col_width
}

/// 等宽字体下文本宽度
pub fn text_width(text: &str) -> f32 {
    text.chars().count() as f32 * FONT_SIZE * CHAR_WIDTH_RATIO
}

/// 等宽折行
///
/// 在不超过列数的最后一个空格处断行；若该位置比列数短 15 个字符以上，
/// 直接在列数处硬断。续行去掉开头空白。
pub fn wrap_mono(text: &str, cols: usize) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.split('\n') {
        let mut line: Vec<char> = raw.chars().collect();
        while line.len() > cols {
            let last_space = line[..=cols].iter().rposition(|c| *c == ' ');
            let cut = match last_space {
                Some(i) if i + 15 >= cols => i,
                _ => cols,
            };
            out.push(line[..cut].iter().collect());
            let rest = &line[cut..];
            let skip = rest.iter().take_while(|c| c.is_whitespace()).count();
            line = rest[skip..].to_vec();
        }
        out.push(line.into_iter().collect());
    }
    out
}

/// 一次绘制：文本、坐标、字体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawOp {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub face: FontFace,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PdfPage {
    /// 1 起页码
    pub number: usize,
    pub draws: Vec<DrawOp>,
}

/// 行处理器：维护当前页和纵向游标，溢出时自动换页
pub struct Liner {
    pages: Vec<PdfPage>,
    y: f32,
    show_page_numbers: bool,
}

impl Liner {
    /// 创建新的行处理器，第一页立即开始
    pub fn new(show_page_numbers: bool) -> Self {
        let mut liner = Self {
            pages: Vec::new(),
            y: PAGE_HEIGHT - MARGIN_TOP,
            show_page_numbers,
        };
        liner.new_page();
        liner
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    fn current(&mut self) -> &mut PdfPage {
        if self.pages.is_empty() {
            self.pages.push(PdfPage { number: 1, draws: Vec::new() });
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(PdfPage { number, draws: Vec::new() });
        self.y = PAGE_HEIGHT - MARGIN_TOP;
        if self.show_page_numbers {
            // 页码画在右上角
            let text = number.to_string();
            let x = PAGE_WIDTH - MARGIN_RIGHT - text_width(&text);
            self.current().draws.push(DrawOp {
                text,
                x,
                y: PAGE_HEIGHT - MARGIN_TOP + 6.0,
                face: FontFace::Regular,
            });
        }
    }

    /// 画一行；游标落到底边距加一行距以内时先换页
    pub fn draw_line(&mut self, text: impl Into<String>, x: f32, face: FontFace) {
        if self.y <= MARGIN_BOTTOM + LEADING {
            self.new_page();
        }
        let y = self.y;
        self.current().draws.push(DrawOp { text: text.into(), x, y, face });
        self.y -= LEADING;
    }

    /// 折行后逐行绘制
    pub fn draw_wrapped(&mut self, text: &str, cols: usize, indent: usize, face: FontFace) {
        for line in wrap_mono(text, cols) {
            self.draw_line(line, col_to_x(indent), face);
        }
    }

    /// 居中画标题，不触发换页
    pub fn draw_centered(&mut self, text: &str, face: FontFace) {
        let x = (PAGE_WIDTH - text_width(text)) / 2.0;
        let y = self.y;
        self.current().draws.push(DrawOp { text: text.to_string(), x, y, face });
    }

    /// 纵向留白
    pub fn skip(&mut self, amount: f32) {
        self.y -= amount;
    }

    pub fn finish(self) -> Vec<PdfPage> {
        self.pages
    }
}
