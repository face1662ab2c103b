use std::io::Write;

use crate::error::Result;
use crate::pager;
use crate::render::Directive;

type Opener = Box<dyn FnMut(&str) -> std::io::Result<()>>;

/// Where a piece of output ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Browser,
    Pager,
    Direct,
}

/// Final hop for rendered text: the writer, an external pager, or the browser.
/// Nothing else in ghx touches the terminal.
pub struct OutputSink<W: Write> {
    out: W,
    pager: String,
    opener: Opener,
}

impl OutputSink<std::io::Stdout> {
    pub fn stdout(pager: Option<String>) -> Self {
        Self::new(
            std::io::stdout(),
            pager::default_pager(pager.as_deref()),
            Box::new(|url| open::that(url)),
        )
    }
}

impl<W: Write> OutputSink<W> {
    pub fn new(out: W, pager: String, opener: Opener) -> Self {
        Self { out, pager, opener }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn deliver(&mut self, text: &str, url: Option<&str>, directive: &Directive) -> Result<Delivery> {
        if directive.browser_open {
            if let Some(url) = url {
                tracing::debug!(url, "opening in browser");
                (self.opener)(url)?;
                return Ok(Delivery::Browser);
            }
        }

        if directive.pager_enabled && text.lines().count() > directive.page_threshold {
            match pager::page(text, &self.pager) {
                Ok(()) => return Ok(Delivery::Pager),
                Err(e) => tracing::debug!(error = %e, "falling back to direct output"),
            }
        }

        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(Delivery::Direct)
    }
}
