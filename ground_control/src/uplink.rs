// Command uplink: one-shot sends and the interactive console.

use clap::Subcommand;
use shared_protocol::{CommandId, Sender, encode_command};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::errors::GroundError;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UplinkCommand {
    /// SET_MODE: 0=OP 1=SAFE 2=IDLE (other values are sent as-is)
    SetMode { #[arg(allow_negative_numbers = true)] mode: i32 },
    ResetSeq,
    Ping,
    /// Arbitrary command id and parameter
    Raw { cmd_id: u8, #[arg(allow_negative_numbers = true)] param: i32 },
}

impl UplinkCommand {
    pub fn wire(self) -> (u8, i32) {
        match self {
            UplinkCommand::SetMode { mode } => (CommandId::SetMode.into(), mode),
            UplinkCommand::ResetSeq => (CommandId::ResetSeq.into(), 0),
            UplinkCommand::Ping => (CommandId::Ping.into(), 0),
            UplinkCommand::Raw { cmd_id, param } => (cmd_id, param),
        }
    }
}

/// Sends command frames with a wrapping sequence counter.
pub struct Uplink {
    sender: Sender,
    seq: u16,
}

impl Uplink {
    pub async fn to(dest: &str, first_seq: u16) -> Result<Self, GroundError> {
        let sender = Sender::to(dest).await?;
        Ok(Self { sender, seq: first_seq })
    }

    /// Returns the seq the frame went out with.
    pub async fn send(&mut self, cmd: UplinkCommand) -> Result<u16, GroundError> {
        let (cmd_id, param) = cmd.wire();
        let seq = self.seq;
        let frame = encode_command(seq, cmd_id, param);
        self.sender.send(&frame).await?;
        info!(seq, cmd_id, param, dest = %self.sender.destination(), "command sent");
        self.seq = self.seq.wrapping_add(1);
        Ok(seq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    Send(UplinkCommand),
    Quit,
    Nothing,
}

pub fn parse_console_line(line: &str) -> Result<ConsoleAction, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(ConsoleAction::Nothing);
    };
    let mut int_arg = |name: &str| -> Result<i32, String> {
        words
            .next()
            .ok_or_else(|| format!("{verb}: missing {name}"))?
            .parse::<i32>()
            .map_err(|e| format!("{verb}: bad {name}: {e}"))
    };
    let cmd = match verb.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => return Ok(ConsoleAction::Quit),
        "setmode" => UplinkCommand::SetMode { mode: int_arg("mode")? },
        "resetseq" => UplinkCommand::ResetSeq,
        "ping" => UplinkCommand::Ping,
        "raw" => {
            let id = int_arg("cmd_id")?;
            let cmd_id = u8::try_from(id).map_err(|_| format!("raw: cmd_id {id} out of range"))?;
            UplinkCommand::Raw { cmd_id, param: int_arg("param")? }
        }
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(ConsoleAction::Send(cmd))
}

const CONSOLE_HELP: &str = "commands: setmode <0|1|2>, resetseq, ping, raw <id> <param>, q";

/// Read commands from stdin until `q` or EOF.
pub async fn console(mut uplink: Uplink) -> Result<(), GroundError> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout.write_all(format!("{CONSOLE_HELP}\n").as_bytes()).await?;
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else { break };
        match parse_console_line(&line) {
            Ok(ConsoleAction::Quit) => break,
            Ok(ConsoleAction::Nothing) => {}
            Ok(ConsoleAction::Send(cmd)) => {
                if let Err(e) = uplink.send(cmd).await {
                    warn!(error = %e, "send failed");
                }
            }
            Err(msg) => {
                stdout.write_all(format!("{msg}\n{CONSOLE_HELP}\n").as_bytes()).await?;
            }
        }
    }
    Ok(())
}
