use std::io::{self, Write};

/// Sink for the structural trace. `depth` is owned by the caller; an
/// emitter only turns it into indentation.
pub trait Emit {
    fn open(&mut self, depth: usize, tag: &str) -> io::Result<()>;
    fn close(&mut self, depth: usize, tag: &str) -> io::Result<()>;
    fn leaf(&mut self, depth: usize, tag: &str, text: &str) -> io::Result<()>;
}

/// Renders the trace as indented XML, one element per line.
pub struct XmlWriter<W: Write> {
    out: W,
    indent: String,
    escape: bool,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            indent: String::from("\t"),
            escape: true,
        }
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn pad(&mut self, depth: usize) -> io::Result<()> {
        for _ in 0..depth {
            self.out.write_all(self.indent.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: Write> Emit for XmlWriter<W> {
    fn open(&mut self, depth: usize, tag: &str) -> io::Result<()> {
        self.pad(depth)?;
        writeln!(self.out, "<{}>", tag)
    }

    fn close(&mut self, depth: usize, tag: &str) -> io::Result<()> {
        self.pad(depth)?;
        writeln!(self.out, "</{}>", tag)
    }

    fn leaf(&mut self, depth: usize, tag: &str, text: &str) -> io::Result<()> {
        self.pad(depth)?;
        if self.escape {
            writeln!(self.out, "<{0}> {1} </{0}>", tag, escape_xml(text))
        } else {
            writeln!(self.out, "<{0}> {1} </{0}>", tag, text)
        }
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}
