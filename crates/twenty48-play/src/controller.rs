use std::fmt::Write as _;
use std::str::FromStr;

use log::{info, warn};
use rand::rngs::StdRng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use twenty48_core::engine::ParseMoveError;
use twenty48_core::{GameSession, Move, ScoreRecord};

use crate::client::{ClientError, ScoreClient};

const HELP: &str = "\
commands:
  w/a/s/d or up/left/down/right   move
  name <NAME>                     set the name scores are submitted under
  submit                          submit the current score
  scores                          refresh the high-score list
  new                             start a new game
  help                            show this help
  quit                            leave
";

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    Name(String),
    Submit,
    Scores,
    New,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = ParseMoveError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "name" => Ok(Command::Name(rest.to_string())),
            "submit" => Ok(Command::Submit),
            "scores" | "highscores" => Ok(Command::Scores),
            "new" | "restart" => Ok(Command::New),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => line.parse().map(Command::Move),
        }
    }
}

/// Completion of a background call to the score service.
#[derive(Debug)]
pub enum ScoreEvent {
    Fetched(Result<Vec<ScoreRecord>, ClientError>),
    Submitted(Result<ScoreRecord, ClientError>),
}

/// What the terminal should print after a line, and whether to stop.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

/// Owns the game session and the displayed high-score list.
///
/// Score calls run as spawned tasks and report back through [`ScoreEvent`]s,
/// so moves keep being handled while a call is in flight.
pub struct Controller {
    session: GameSession,
    rng: StdRng,
    client: ScoreClient,
    high_scores: Vec<ScoreRecord>,
    events: mpsc::UnboundedSender<ScoreEvent>,
    // score calls spawned but not yet handled
    pending: usize,
}

impl Controller {
    pub fn new(
        session: GameSession,
        rng: StdRng,
        client: ScoreClient,
    ) -> (Self, mpsc::UnboundedReceiver<ScoreEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            session,
            rng,
            client,
            high_scores: Vec::new(),
            events,
            pending: 0,
        };
        (controller, rx)
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn high_scores(&self) -> &[ScoreRecord] {
        &self.high_scores
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::default();
        }
        match line.parse::<Command>() {
            Ok(cmd) => self.handle_command(cmd),
            Err(err) => Reply::text(format!("{err}; type 'help' for commands\n")),
        }
    }

    pub fn handle_command(&mut self, cmd: Command) -> Reply {
        match cmd {
            Command::Move(dir) => {
                let outcome = self.session.apply_move(dir, &mut self.rng);
                if outcome.changed {
                    Reply::text(self.render())
                } else {
                    Reply::text(format!("nothing moves {dir}\n"))
                }
            }
            Command::Name(name) => {
                self.session.set_name(name);
                Reply::text(format!("name set to '{}'\n", self.session.name()))
            }
            Command::Submit => match self.session.submission() {
                Ok(record) => {
                    self.request_submit(record);
                    Reply::text("submitting score...\n")
                }
                Err(err) => Reply::text(format!("{err}\n")),
            },
            Command::Scores => {
                self.request_fetch();
                Reply::text("fetching high scores...\n")
            }
            Command::New => {
                self.session.restart(&mut self.rng);
                Reply::text(self.render())
            }
            Command::Help => Reply::text(HELP),
            Command::Quit => Reply {
                text: format!("final score: {}\n", self.session.score()),
                quit: true,
            },
        }
    }

    /// Apply a finished score call. A failed call leaves the list on display unchanged.
    pub fn handle_event(&mut self, event: ScoreEvent) -> String {
        self.pending = self.pending.saturating_sub(1);
        match event {
            ScoreEvent::Fetched(Ok(records)) => {
                self.high_scores = records;
                self.render_high_scores()
            }
            ScoreEvent::Fetched(Err(err)) => {
                warn!("error fetching high scores: {err}");
                format!("could not fetch high scores: {err}\n")
            }
            ScoreEvent::Submitted(Ok(record)) => {
                info!("submitted {} for {}", record.score, record.name);
                self.request_fetch();
                format!("submitted {} for {}\n", record.score, record.name)
            }
            ScoreEvent::Submitted(Err(err)) => {
                warn!("error submitting score: {err}");
                format!("could not submit score: {err}\n")
            }
        }
    }

    /// Score calls whose events have not been handled yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn request_fetch(&mut self) {
        self.pending += 1;
        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.fetch().await;
            let _ = events.send(ScoreEvent::Fetched(result));
        });
    }

    fn request_submit(&mut self, record: ScoreRecord) {
        self.pending += 1;
        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.submit(&record).await.map(|()| record);
            let _ = events.send(ScoreEvent::Submitted(result));
        });
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "\n{}", self.session.board());
        let name = match self.session.name() {
            "" => "(no name)",
            name => name,
        };
        let _ = writeln!(out, "score: {}   player: {}", self.session.score(), name);
        out
    }

    pub fn render_high_scores(&self) -> String {
        let mut out = String::from("high scores:\n");
        if self.high_scores.is_empty() {
            out.push_str("  (none yet)\n");
        }
        for (idx, record) in self.high_scores.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {:<20} {:>8}", idx + 1, record.name, record.score);
        }
        out
    }

    /// Read commands until `quit` or end of input, printing score results as they arrive.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily and rejected like any
    /// other unknown command. Score calls still in flight when input stops are
    /// waited for, so a submitted score is never dropped on exit.
    pub async fn run<I, O>(
        mut self,
        mut input: I,
        mut output: O,
        mut events: mpsc::UnboundedReceiver<ScoreEvent>,
    ) -> std::io::Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        self.request_fetch();
        output.write_all(self.render().as_bytes()).await?;
        output.flush().await?;
        loop {
            let text = tokio::select! {
                read = input.read_until(b'\n', &mut buf) => {
                    if read? == 0 && buf.is_empty() {
                        break;
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    buf.clear();
                    let reply = self.handle_line(&line);
                    if reply.quit {
                        output.write_all(reply.text.as_bytes()).await?;
                        break;
                    }
                    reply.text
                }
                Some(event) = events.recv() => self.handle_event(event),
            };
            output.write_all(text.as_bytes()).await?;
            output.flush().await?;
        }
        while self.pending > 0 {
            let Some(event) = events.recv().await else { break };
            let text = self.handle_event(event);
            output.write_all(text.as_bytes()).await?;
        }
        output.flush().await?;
        Ok(())
    }
}
