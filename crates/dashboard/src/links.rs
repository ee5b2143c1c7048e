use framework::prelude::*;
use std::cell::RefCell;
use std::process::{Command, ExitStatus, Stdio};
use std::rc::Rc;
use std::thread::{self, JoinHandle};

/// Opens outbound links such as a trainer's resume.
pub trait LinkOpener {
    fn open(&mut self, uri: &str) -> Result<()>;
}

/// Hands links to the desktop's default handler.
#[derive(Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&mut self, uri: &str) -> Result<()> {
        let mut command = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else if cfg!(target_os = "macos") {
            Command::new("open")
        } else {
            Command::new("xdg-open")
        };

        command.arg(uri);
        spawn_reaped(command)?;
        tracing::info!(uri, "opened link");
        Ok(())
    }
}

/// Starts `command` detached from the terminal and waits for it on a
/// background thread so the exited process is reaped.
fn spawn_reaped(mut command: Command) -> Result<JoinHandle<Option<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(thread::spawn(move || match child.wait() {
        Ok(status) => {
            if !status.success() {
                tracing::warn!(%status, "link handler failed");
            }
            Some(status)
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not wait for link handler");
            None
        }
    }))
}

/// Remembers links instead of opening them. Clones share the list.
#[derive(Clone, Default)]
pub struct RecordingOpener {
    opened: Rc<RefCell<Vec<String>>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&mut self, uri: &str) -> Result<()> {
        self.opened.borrow_mut().push(uri.to_string());
        Ok(())
    }
}

/// The link opener in use.
pub struct Links(Box<dyn LinkOpener>);

impl Links {
    pub fn new(opener: impl LinkOpener + 'static) -> Self {
        Self(Box::new(opener))
    }
}

impl_resource!(Links);

pub trait LinksContextExt {
    /// Opens `uri` with the `Links` resource, falling back to the
    /// system handler. Blank links are refused.
    fn open_link(&mut self, uri: &str) -> Result<()>;
}

impl LinksContextExt for Context {
    fn open_link(&mut self, uri: &str) -> Result<()> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(Error::Validation("no link on file".into()));
        }
        if !self.has_resource::<Links>() {
            self.add_resource(Links::new(SystemOpener));
        }
        match self.get_resource_mut::<Links>() {
            Some(links) => links.0.open(uri),
            None => Err(Error::new("link opener missing")),
        }
    }
}
