use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use crate::{config::Config, Error};

/// Usernames accepted when the gate runs without a bot token.
const DEMO_MEMBERS: [&str; 4] = ["admin", "test", "demo", "user"];

const MEMBER_STATUSES: [&str; 3] = ["creator", "administrator", "member"];

#[derive(Debug, Serialize)]
pub struct Verification {
    pub verified: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberInfo>,
}

#[derive(Debug, Serialize)]
pub struct MemberInfo {
    pub username: String,
    pub status: String,
}

/// Checks whether a visitor has joined the promoted channel before handing
/// out invites. With a bot token this asks the chat platform's bot API;
/// without one it falls back to a fixed demo allowlist.
pub enum MembershipGate {
    Demo,
    Bot(BotGate),
}

pub struct BotGate {
    client: Client,
    api_base: String,
    bot_token: String,
    channel: String,
}

/// Strips the optional `@` prefix and rejects anything that could not be a
/// real channel username.
pub fn clean_username(raw: &str) -> Result<&str, Error> {
    let name = raw.trim();
    let name = name.strip_prefix('@').unwrap_or(name);

    if name.len() < 3 || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(Error::Validation("Invalid username format"));
    }

    Ok(name)
}

impl MembershipGate {
    pub fn from_config(config: &Config) -> Result<MembershipGate, anyhow::Error> {
        match &config.gate_bot_token {
            Some(token) if !token.is_empty() => {
                let client = Client::builder()
                    .timeout(std::time::Duration::from_secs(10))
                    .build()?;

                Ok(MembershipGate::Bot(BotGate {
                    client,
                    api_base: config.gate_api_base.trim_end_matches('/').to_string(),
                    bot_token: token.clone(),
                    channel: config.gate_channel.clone(),
                }))
            }
            _ => Ok(MembershipGate::Demo),
        }
    }

    /// Checks `username` against the configured channel. The caller must
    /// have cleaned the name with [`clean_username`] first.
    pub async fn verify(&self, username: &str) -> Result<Verification, Error> {
        match self {
            MembershipGate::Demo => Ok(demo_verify(username)),
            MembershipGate::Bot(gate) => gate.verify(username).await,
        }
    }
}

fn demo_verify(username: &str) -> Verification {
    let member = DEMO_MEMBERS
        .iter()
        .any(|m| m.eq_ignore_ascii_case(username));

    if member {
        Verification {
            verified: true,
            message: "Membership verified (demo mode)".to_string(),
            member: Some(MemberInfo {
                username: username.to_string(),
                status: "member".to_string(),
            }),
        }
    } else {
        not_a_member()
    }
}

fn not_a_member() -> Verification {
    Verification {
        verified: false,
        message: "Please join the channel first and try again.".to_string(),
        member: None,
    }
}

#[derive(Debug, Deserialize)]
struct ChatMemberResponse {
    ok: bool,
    result: Option<ChatMemberResult>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMemberResult {
    status: String,
}

impl BotGate {
    async fn verify(&self, username: &str) -> Result<Verification, Error> {
        let url = format!("{}/bot{}/getChatMember", self.api_base, self.bot_token);
        let user_id = format!("@{username}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("chat_id", self.channel.as_str()),
                ("user_id", user_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                event!(Level::ERROR, error = %e, "Membership check request failed");
                Error::GateUnavailable
            })?;

        // The bot API reports errors in a JSON body as well, so parse
        // before looking at the HTTP status.
        let body: ChatMemberResponse = response.json().await.map_err(|e| {
            event!(Level::ERROR, error = %e, "Unreadable membership check response");
            Error::GateUnavailable
        })?;

        match body {
            ChatMemberResponse {
                ok: true,
                result: Some(member),
                ..
            } => {
                if MEMBER_STATUSES.contains(&member.status.as_str()) {
                    Ok(Verification {
                        verified: true,
                        message: "Membership verified successfully".to_string(),
                        member: Some(MemberInfo {
                            username: username.to_string(),
                            status: member.status,
                        }),
                    })
                } else {
                    // Statuses like "left" and "kicked" mean the account
                    // exists but is not in the channel.
                    Ok(not_a_member())
                }
            }
            ChatMemberResponse {
                description: Some(description),
                ..
            } if description.to_lowercase().contains("user not found") => Ok(not_a_member()),
            ChatMemberResponse { description, .. } => {
                event!(Level::ERROR, ?description, "Membership check rejected");
                Err(Error::GateUnavailable)
            }
        }
    }
}
