//! voicefeed console demo - composition root.
//!
//! Ties the crates together into an interactive terminal session:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Configure a session controller against the simulated platform
//! 4. Bind it to the widget and drive it from stdin
//!
//! Typed lines stand in for speech. An empty line presses the button;
//! `:submit`, `:cancel`, `:error <code>` and `:quit` are commands.

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use voicefeed_core::config::VoiceFeedConfig;
use voicefeed_core::types::EngineErrorCode;
use voicefeed_session::{EngineProbe, SessionController, SessionHandlers, SimulatedPlatform};
use voicefeed_ui::{VoiceFeedbackWidget, WidgetOptions};

use crate::cli::CliArgs;

/// One line of console input.
#[derive(Debug, PartialEq)]
enum Command {
    Press,
    Submit,
    Cancel,
    Error(EngineErrorCode),
    Say(String),
    Quit,
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line {
        "" | ":press" => Command::Press,
        ":submit" => Command::Submit,
        ":cancel" => Command::Cancel,
        ":quit" | ":q" => Command::Quit,
        _ => match line.strip_prefix(":error") {
            Some(code) if !code.trim().is_empty() => {
                Command::Error(EngineErrorCode::from(code.trim().to_string()))
            }
            Some(_) => Command::Error(EngineErrorCode::NoSpeech),
            None => Command::Say(line.to_string()),
        },
    }
}

enum Input {
    Line(Option<String>),
    Pumped(bool),
}

fn handlers(alert_unhandled: bool) -> SessionHandlers {
    SessionHandlers::new()
        .on_start(|| println!("(listening)"))
        .on_end(|| println!("(stopped)"))
        .on_transcript(|text| println!("recognized: {}", text))
        .alert_unhandled(alert_unhandled)
}

fn apply(command: Command, widget: &mut VoiceFeedbackWidget, probe: &EngineProbe) -> bool {
    match command {
        Command::Press => widget.press(),
        Command::Submit => match widget.submit() {
            Some(text) => println!("submitted: {}", text),
            None => println!("nothing to submit"),
        },
        Command::Cancel => widget.cancel(),
        Command::Error(code) => {
            if !probe.fire_error(code) {
                println!("no engine attached");
            }
        }
        Command::Say(text) => {
            if probe.is_capturing() {
                probe.fire_result(&text);
            } else {
                println!("not listening; press enter first");
            }
        }
        Command::Quit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = if config_file.exists() {
        VoiceFeedConfig::load(&config_file)?
    } else {
        VoiceFeedConfig::default()
    };
    args.apply_overrides(&mut config);

    // Tracing.
    let log_level = args.resolve_log_level(&config);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting voicefeed v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Platform.
    let mut platform = if args.unsupported {
        SimulatedPlatform::unsupported()
    } else {
        SimulatedPlatform::new()
    }
    .with_auto_ack(true);
    if let Some(locale) = args.platform_locale() {
        platform = platform.with_locale(locale);
    }
    let probe = platform.probe();

    // Controller + widget.
    let controller = SessionController::configure(
        Arc::new(platform),
        config.session.to_session_config(),
        handlers(config.general.alert_when_unhandled),
    );
    let options = WidgetOptions::from_settings(&config.widget, controller.language());

    let mut events = controller.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => tracing::debug!(event = %json, "Session event"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize session event"),
            }
        }
    });

    let mut widget = VoiceFeedbackWidget::new(controller, options);
    println!("{}", widget.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            alive = widget.pump() => Input::Pumped(alive),
        };
        let keep_going = match input {
            Input::Line(Some(line)) => apply(parse_command(&line), &mut widget, &probe),
            Input::Line(None) => false,
            Input::Pumped(alive) => {
                widget.pump_pending();
                alive
            }
        };
        if let Some(view) = widget.take_update() {
            println!("{}", view);
        }
        if !keep_going {
            break;
        }
    }

    widget.dispose();
    tracing::info!("voicefeed stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command(""), Command::Press);
        assert_eq!(parse_command("  :press "), Command::Press);
        assert_eq!(parse_command(":submit"), Command::Submit);
        assert_eq!(parse_command(":cancel"), Command::Cancel);
        assert_eq!(parse_command(":q"), Command::Quit);
        assert_eq!(
            parse_command(":error network"),
            Command::Error(EngineErrorCode::Network)
        );
        assert_eq!(
            parse_command(":error"),
            Command::Error(EngineErrorCode::NoSpeech)
        );
        assert_eq!(
            parse_command("hello there"),
            Command::Say("hello there".to_string())
        );
    }

    #[test]
    fn test_apply_say_requires_listening() {
        let platform = SimulatedPlatform::new().with_auto_ack(true);
        let probe = platform.probe();
        let controller = SessionController::configure(
            Arc::new(platform),
            Default::default(),
            SessionHandlers::default(),
        );
        let mut widget = VoiceFeedbackWidget::new(controller, WidgetOptions::default());

        assert!(apply(Command::Say("early".into()), &mut widget, &probe));
        widget.pump_pending();
        assert_eq!(widget.controller().snapshot().transcript, "");

        assert!(apply(Command::Press, &mut widget, &probe));
        widget.pump_pending();
        assert!(apply(Command::Say("now".into()), &mut widget, &probe));
        widget.pump_pending();
        assert_eq!(widget.controller().snapshot().transcript, "now");

        assert!(!apply(Command::Quit, &mut widget, &probe));
    }
}
