//! Interactive chat loop.

use std::io::{self, Write};
use std::ops::ControlFlow;

use survey_chat_core::render::{MessageView, SourceDataPanel, typing_placeholder};
use survey_chat_core::{ChatBackend, ChatController, SubmitOutcome};
use survey_types::{MODEL_OPTIONS, ModelOption};
use tracing::debug;

const HELP: &str = "Commands: /new, /model <id>, /models, /toggle <dataset>, /quit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    NewChat,
    Model(Option<String>),
    Models,
    Toggle(String),
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Self::Submit(line.to_owned());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest.trim_end(), ""),
        };
        match name {
            "new" => Self::NewChat,
            "model" if arg.is_empty() => Self::Model(None),
            "model" => Self::Model(Some(arg.to_owned())),
            "models" => Self::Models,
            "toggle" if !arg.is_empty() => Self::Toggle(arg.to_owned()),
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(name.to_owned()),
        }
    }
}

/// A chat controller plus what the terminal has already shown.
pub struct Session<B> {
    chat: ChatController<B>,
    panel: SourceDataPanel,
    shown: usize,
}

impl<B: ChatBackend> Session<B> {
    pub fn new(chat: ChatController<B>) -> Self {
        Self {
            chat,
            panel: SourceDataPanel::new(),
            shown: 0,
        }
    }

    pub fn controller(&self) -> &ChatController<B> {
        &self.chat
    }

    /// Print the opening greeting and the command summary.
    pub fn start<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{HELP}")?;
        self.print_new_messages(out)
    }

    pub async fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<ControlFlow<()>> {
        match command {
            Command::Submit(text) => {
                self.chat.set_input(text);
                if !self.chat.store().can_submit() {
                    return Ok(ControlFlow::Continue(()));
                }
                writeln!(out, "{}", typing_placeholder().render_text())?;
                out.flush()?;

                let outcome = self.chat.submit().await;
                debug!(?outcome, "submission finished");
                self.print_new_messages(out)?;
                if let Some(banner) = self.chat.store().error() {
                    writeln!(out, "! {banner}")?;
                }
                if outcome == SubmitOutcome::Replied {
                    self.panel.replace(self.chat.store().source_data());
                    self.print_panel(out)?;
                }
            }
            Command::NewChat => {
                self.chat.new_chat();
                self.panel.replace(None);
                self.shown = 0;
                self.print_new_messages(out)?;
            }
            Command::Model(None) => writeln!(out, "Model: {}", self.chat.model())?,
            Command::Model(Some(id)) => match ModelOption::find(&id) {
                Some(option) => {
                    self.chat.set_model(option.value);
                    writeln!(out, "Model: {}", option.label)?;
                }
                None => writeln!(out, "Unknown model '{id}'; see /models")?,
            },
            Command::Models => {
                for option in MODEL_OPTIONS {
                    let mark = if option.value == self.chat.model() { '*' } else { ' ' };
                    writeln!(out, "{mark} {:<18} {}", option.value, option.label)?;
                }
            }
            Command::Toggle(name) => match self.panel.toggle(&name) {
                Some(_) => self.print_panel(out)?,
                None => writeln!(out, "No dataset named '{name}'")?,
            },
            Command::Quit => return Ok(ControlFlow::Break(())),
            Command::Unknown(name) => writeln!(out, "Unknown command '/{name}'. {HELP}")?,
        }
        Ok(ControlFlow::Continue(()))
    }

    fn print_new_messages<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let transcript = self.chat.store().transcript();
        for message in transcript.iter().skip(self.shown) {
            writeln!(out, "{}", MessageView::new(message).render_text())?;
        }
        self.shown = transcript.len();
        Ok(())
    }

    fn print_panel<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if let Some(text) = self.panel.render_text() {
            writeln!(out, "{text}")?;
        }
        Ok(())
    }
}
