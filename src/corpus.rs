//! Locate documents in an RST Signalling Corpus checkout
//!
//! The corpus keeps raw text in `Corpus/All_Files/<doc>` and the signal annotations for the same
//! document in `Analyses/All_Files/<doc>/Signal.xml`.
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use errors::*;

/// Folder of the signal annotations, relative to the corpus root
pub const SIGNALS_DIR: [&'static str; 2] = ["Analyses", "All_Files"];
/// Folder of the raw texts, relative to the corpus root
pub const TEXTS_DIR: [&'static str; 2] = ["Corpus", "All_Files"];
/// Markup file inside each document's signal folder
pub const SIGNAL_FILE: &'static str = "Signal.xml";
/// Separator placed between lines when building the indexable text
pub const LINE_JOIN: char = '_';

/// The two halves of a corpus on disk
#[derive(Debug, Clone)]
pub struct Corpus {
    pub signals: PathBuf,
    pub texts: PathBuf,
}

impl Corpus {
    /// Point at a corpus root.
    ///
    /// Missing folders are only reported, reading documents later is what fails.
    pub fn open<P: AsRef<Path>>(root: P) -> Corpus {
        let root = root.as_ref();
        if !root.exists() {
            error!("Root folder {} not found", root.display());
        }
        let corpus = Corpus {
            signals: SIGNALS_DIR.iter().fold(root.to_path_buf(), |p, part| p.join(part)),
            texts: TEXTS_DIR.iter().fold(root.to_path_buf(), |p, part| p.join(part)),
        };
        for folder in &[&corpus.signals, &corpus.texts] {
            if !folder.exists() {
                error!("Could not find folder: {}", folder.display());
            }
        }
        corpus
    }

    /// All entries of the text folder in filename order, hidden ones included
    pub fn documents(&self) -> Result<Vec<Document>> {
        let mut names = vec![];
        for entry in fs::read_dir(&self.texts)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names.into_iter().map(|name| self.document(name)).collect())
    }

    /// Paths of a single document, whether or not they exist
    pub fn document<S: Into<String>>(&self, id: S) -> Document {
        let id = id.into();
        Document {
            text_path: self.texts.join(&id),
            markup_path: self.signals.join(&id).join(SIGNAL_FILE),
            id: id,
        }
    }
}

/// One document: a raw text and its signal markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text_path: PathBuf,
    pub markup_path: PathBuf,
}

impl Document {
    /// Names starting with `.` are not documents and are never read
    pub fn is_hidden(&self) -> bool {
        self.id.starts_with('.')
    }

    /// Read the raw text as lines joined with an underscore
    pub fn read_text(&self) -> Result<JoinedText> {
        let mut content = String::new();
        File::open(&self.text_path)
            .map_err(|err| Error::MissingFile("raw text", self.text_path.clone(), err))?
            .read_to_string(&mut content)?;
        Ok(JoinedText::new(&content))
    }

    /// Read the Signal.xml of this document
    pub fn read_markup(&self) -> Result<String> {
        let mut content = String::new();
        File::open(&self.markup_path)
            .map_err(|err| Error::MissingFile("signal markup", self.markup_path.clone(), err))?
            .read_to_string(&mut content)?;
        Ok(content)
    }
}

/// Document text that segment offsets are applied to
///
/// Lines keep their terminators and are joined with `_`, so `"a\nb\n"` becomes `"a\n_b\n"`.
/// This does not reproduce the file and may shift offsets against it; the segment offsets in
/// the corpus are applied to this string as is. Offsets count characters, not bytes.
#[derive(Debug, Clone)]
pub struct JoinedText {
    text: String,
    /// Byte offset of every character, plus the total length
    bounds: Vec<usize>,
}

impl JoinedText {
    pub fn new(raw: &str) -> JoinedText {
        // Universal newlines
        let raw = raw.replace("\r\n", "\n").replace('\r', "\n");
        let mut text = String::with_capacity(raw.len() + raw.len() / 40);
        for (i, line) in raw.split_inclusive('\n').enumerate() {
            if i > 0 {
                text.push(LINE_JOIN);
            }
            text.push_str(line);
        }
        let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bounds.push(text.len());
        JoinedText { text: text, bounds: bounds }
    }

    /// Characters `start..end`, like a sequence slice
    ///
    /// Negative bounds count back from the end, bounds outside the text are clamped to it, and
    /// `start >= end` is empty.
    pub fn slice(&self, start: i64, end: i64) -> &str {
        let len = self.char_len() as i64;
        let bound = |i: i64| -> usize {
            let i = if i < 0 { i + len } else { i };
            i.max(0).min(len) as usize
        };
        let (start, end) = (bound(start), bound(end));
        if start >= end {
            return "";
        }
        &self.text[self.bounds[start]..self.bounds[end]]
    }

    pub fn char_len(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}
