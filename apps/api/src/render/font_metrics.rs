//! Static font-metric tables for the two PDF base fonts.
//!
//! Widths are in em units (relative to font size), taken from the Adobe AFM
//! files for Helvetica and Helvetica-Bold. Both tables cover ASCII 0x20..=0x7E
//! (95 printable characters); index = (char as usize) - 32. The handful of
//! WinAnsi punctuation glyphs the renderer emits are special-cased.

// ────────────────────────────────────────────────────────────────────────────
// Fonts
// ────────────────────────────────────────────────────────────────────────────

/// The base-14 fonts the PDF renderer embeds by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// PDF `BaseFont` name.
    pub fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name used inside page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    pub fn metrics(self) -> &'static FontMetricTable {
        match self {
            Font::Regular => &HELVETICA_TABLE,
            Font::Bold => &HELVETICA_BOLD_TABLE,
        }
    }

    /// Width of `s` in points at `size_pt`.
    pub fn measure(self, s: &str, size_pt: f32) -> f32 {
        self.metrics().measure_str(s) * size_pt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback for characters outside the table.
    pub average_char_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    return self.widths[code - 32];
                }
                match c {
                    '•' => 0.350,
                    '–' => 0.556,
                    '—' => 1.000,
                    '‘' | '’' => 0.278,
                    '“' | '”' => 0.500,
                    _ => self.average_char_width,
                }
            })
            .sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.556,
};

// ────────────────────────────────────────────────────────────────────────────
// Greedy word wrap over mixed-weight runs
// ────────────────────────────────────────────────────────────────────────────

/// Text drawn in a single font.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: Font,
}

impl TextRun {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }
}

/// Width of a sequence of runs in points.
pub fn runs_width(runs: &[TextRun], size_pt: f32) -> f32 {
    runs.iter().map(|r| r.font.measure(&r.text, size_pt)).sum()
}

/// Appends `run`, merging it into the previous run when the font matches.
fn push_run(line: &mut Vec<TextRun>, run: TextRun) {
    match line.last_mut() {
        Some(last) if last.font == run.font => last.text.push_str(&run.text),
        _ => line.push(run),
    }
}

/// Splits runs into words. A word may cross a weight boundary (`**X**,`).
fn split_words(runs: &[TextRun]) -> Vec<Vec<TextRun>> {
    let mut words = Vec::new();
    let mut current: Vec<TextRun> = Vec::new();
    for run in runs {
        let mut piece = String::new();
        for c in run.text.chars() {
            if c.is_whitespace() {
                if !piece.is_empty() {
                    push_run(&mut current, TextRun::new(std::mem::take(&mut piece), run.font));
                }
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else {
                piece.push(c);
            }
        }
        if !piece.is_empty() {
            push_run(&mut current, TextRun::new(piece, run.font));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Hard-breaks a word wider than `max_width` into chunks that each fit.
fn break_word(word: Vec<TextRun>, size_pt: f32, max_width: f32) -> Vec<Vec<TextRun>> {
    if runs_width(&word, size_pt) <= max_width {
        return vec![word];
    }
    let mut chunks = Vec::new();
    let mut chunk: Vec<TextRun> = Vec::new();
    let mut width = 0.0_f32;
    for run in word {
        for c in run.text.chars() {
            let w = run.font.measure(c.encode_utf8(&mut [0; 4]), size_pt);
            if !chunk.is_empty() && width + w > max_width {
                chunks.push(std::mem::take(&mut chunk));
                width = 0.0;
            }
            push_run(&mut chunk, TextRun::new(c, run.font));
            width += w;
        }
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}

/// Greedy word wrap: words are packed onto a line until the next one would
/// exceed `max_width`. Whitespace collapses to single spaces.
pub fn wrap_runs(runs: &[TextRun], size_pt: f32, max_width: f32) -> Vec<Vec<TextRun>> {
    let mut lines = Vec::new();
    let mut line: Vec<TextRun> = Vec::new();
    let mut width = 0.0_f32;

    for word in split_words(runs) {
        for piece in break_word(word, size_pt, max_width) {
            let piece_w = runs_width(&piece, size_pt);
            let space_font = line.last().map(|r| r.font).unwrap_or(Font::Regular);
            let space_w = space_font.measure(" ", size_pt);

            if !line.is_empty() && width + space_w + piece_w > max_width {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            if !line.is_empty() {
                push_run(&mut line, TextRun::new(" ", space_font));
                width += space_w;
            }
            for run in piece {
                push_run(&mut line, run);
            }
            width += piece_w;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
