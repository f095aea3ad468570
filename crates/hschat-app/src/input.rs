//! 입력 줄 해석.
//!
//! 일반 텍스트는 글자마다 키 입력으로 흘려 보낸 뒤 전송하고,
//! `/`로 시작하는 줄은 명령으로 처리한다.

use hschat_core::models::view::HandoffAction;
use hschat_session::command::SessionCommand;
use hschat_suggestion::request::parse_preferences;

use crate::terminal::Latest;

pub const HELP: &str = "\
Commandes:
  /suggest <préférences>  demander des suggestions (ex: budget=premium, occasion=mariage)
  /open <n>               activer le bouton n de la dernière carte conseiller
  /decline                refuser la dernière proposition de conseiller
  /dismiss                fermer la dernière notification
  /quit                   quitter";

/// 해석된 입력 줄
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    Text(String),
    Suggest(String),
    Open(usize),
    Decline,
    Dismiss,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> UserInput {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix('/') else {
        return UserInput::Text(line.to_string());
    };

    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    let arg = arg.trim();
    match name {
        "suggest" => UserInput::Suggest(arg.to_string()),
        "open" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => UserInput::Open(n),
            _ => UserInput::Invalid(format!("numéro de bouton invalide: '{arg}'")),
        },
        "decline" => UserInput::Decline,
        "dismiss" => UserInput::Dismiss,
        "help" => UserInput::Help,
        "quit" | "exit" => UserInput::Quit,
        other => UserInput::Invalid(format!("commande inconnue: /{other}")),
    }
}

/// 입력 → 세션 명령 (참조할 항목이 없으면 사용자에게 보여줄 메시지)
pub fn to_commands(input: UserInput, latest: &Latest) -> Result<Vec<SessionCommand>, String> {
    match input {
        UserInput::Text(text) => {
            let mut commands: Vec<_> = text.chars().map(SessionCommand::Keystroke).collect();
            commands.push(SessionCommand::Submit);
            Ok(commands)
        }
        UserInput::Suggest(prefs) => Ok(vec![SessionCommand::RequestSuggestions(
            parse_preferences(&prefs),
        )]),
        UserInput::Open(n) => {
            let (entry, actions) = latest
                .handoff
                .as_ref()
                .ok_or_else(|| "aucune carte conseiller".to_string())?;
            if n > actions.len() {
                return Err(format!("la carte n'a que {} boutons", actions.len()));
            }
            Ok(vec![SessionCommand::Activate {
                entry: *entry,
                action: n - 1,
            }])
        }
        UserInput::Decline => {
            let (entry, actions) = latest
                .handoff
                .as_ref()
                .ok_or_else(|| "aucune carte conseiller".to_string())?;
            let action = actions
                .iter()
                .position(|a| matches!(a, HandoffAction::Decline { .. }))
                .ok_or_else(|| "cette carte ne propose pas de refus".to_string())?;
            Ok(vec![SessionCommand::Activate {
                entry: *entry,
                action,
            }])
        }
        UserInput::Dismiss => latest
            .notices
            .last()
            .map(|id| vec![SessionCommand::DismissNotice(*id)])
            .ok_or_else(|| "aucune notification".to_string()),
        UserInput::Help | UserInput::Quit => Ok(Vec::new()),
        UserInput::Invalid(message) => Err(message),
    }
}
