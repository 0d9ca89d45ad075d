//! Operator console
//!
//! A line-oriented front end over [`SessionController`]. Lookups and order
//! submissions run on spawned tasks so the operator can keep typing; their
//! outcomes arrive through the notice printer.

use std::fmt::Write as _;
use std::sync::Arc;

use loyalty_client::{ClientError, LoyaltyHttpClient};
use loyalty_session::{
    Composition, Notice, Phase, PhaseKind, SelectionChange, Session, SessionController, Trigger,
};
use shared::ErrorCode;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

const HELP: &str = "\
Commands:
  login <email> <password>   sign in as cashier
  forgot <email>             mail a password reset link
  scan                       open the camera scanner
  back                       close the scanner
  code <code>                submit a membership code (camera if scanning, typed otherwise)
  menu                       list meals that can be bought with points
  toggle <meal-id>           add or remove a meal
  amount [value]             set the order amount (empty clears it)
  submit [amount]            create the order
  rescan                     drop the member and scan again
  reset                      drop the member
  show                       print the current session
  signout                    forget the cashier credential
  help                       this text
  quit                       exit";

// =============================================================================
// Command parsing
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Forgot(String),
    Scan,
    Back,
    Code(String),
    Menu,
    Toggle(String),
    Amount(String),
    Submit(Option<String>),
    Rescan,
    Reset,
    Show,
    SignOut,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    let command = match name.to_ascii_lowercase().as_str() {
        "login" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(email), Some(password), None) => Command::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                },
                _ => return Err(ParseError::Usage("login <email> <password>")),
            }
        }
        "forgot" => Command::Forgot(arg.ok_or(ParseError::Usage("forgot <email>"))?),
        "scan" => Command::Scan,
        "back" => Command::Back,
        // 空白交给会话层校验，保证错误经由通知统一上报
        "code" => Command::Code(rest.to_string()),
        "menu" => Command::Menu,
        "toggle" => Command::Toggle(arg.ok_or(ParseError::Usage("toggle <meal-id>"))?),
        "amount" => Command::Amount(rest.to_string()),
        "submit" => Command::Submit(arg),
        "rescan" => Command::Rescan,
        "reset" => Command::Reset,
        "show" => Command::Show,
        "signout" | "logout" => Command::SignOut,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

// =============================================================================
// Rendering
// =============================================================================

pub fn render_notice(notice: &Notice) -> Option<String> {
    let line = match notice {
        Notice::PhaseChanged { to, .. } => match to {
            PhaseKind::Scanning => "Scanner open, point the camera at the member code".to_string(),
            PhaseKind::Resolving => "Looking up member...".to_string(),
            PhaseKind::Submitting => "Creating order...".to_string(),
            PhaseKind::Idle | PhaseKind::Ready => return None,
        },
        Notice::Resolved {
            restaurant_id,
            membership_code,
            points,
        } => format!(
            "Member {membership_code} at restaurant {restaurant_id}: {points} points. Type `menu`."
        ),
        Notice::SelectionChanged(outcome) => {
            let sign = match outcome.change {
                SelectionChange::Added => '+',
                SelectionChange::Removed => '-',
            };
            format!(
                "{sign} {} (used {} points, {} left)",
                outcome.label,
                outcome.draft.used_points(),
                outcome.available_points
            )
        }
        Notice::OrderCreated(order) => {
            let mut line = format!(
                "Order created: {}{} paid, {} points used, balance {} -> {}",
                order.order_amount,
                order.currency_symbol,
                order.used_points,
                order.previous_points,
                order.new_balance
            );
            if let Some(id) = &order.order_id {
                let _ = write!(line, " (order {id})");
            }
            // 服务端余额只做参考展示
            if let Some(balance) = order.server_balance {
                let _ = write!(line, ", server balance {balance}");
            }
            line
        }
        Notice::Failed(error) if error.is_advisory() => format!("! {error}"),
        Notice::Failed(error) => failure_line(error.code(), error),
        Notice::SignedOut => "Signed out. Use `login <email> <password>`.".to_string(),
    };
    Some(line)
}

/// `x [category/code] message`
fn failure_line(code: ErrorCode, message: impl std::fmt::Display) -> String {
    format!("x [{}/{code}] {message}", code.category().name())
}

/// Sign-in failures point at the reset flow when the password was refused
pub fn render_sign_in_error(error: &ClientError) -> String {
    let code = error.code();
    let mut line = failure_line(code, format_args!("Sign-in failed: {error}"));
    if code.requires_sign_in() {
        line.push_str(". Forgot it? Use `forgot <email>`.");
    }
    line
}

/// Composable meals with their selection marks
pub fn render_menu(composition: &Composition) -> String {
    let symbol = composition.context.currency_symbol();
    let mut out = String::new();
    for meal in composition.context.composable_meals() {
        let mark = if composition.selection.contains(&meal.id) {
            'x'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "[{mark}] {:<8} {:<24} {}{} {:>6} pts",
            meal.id,
            meal.label,
            meal.price,
            symbol,
            meal.points_to_buy.unwrap_or_default()
        );
    }
    if out.is_empty() {
        out.push_str("No meal can be bought with points here\n");
    }
    out
}

pub fn render_session(session: &Session) -> String {
    let mut out = format!("Phase: {}\n", session.kind());
    match session.phase() {
        Phase::Resolving { code, .. } => {
            let _ = writeln!(out, "Code: {code}");
        }
        Phase::Ready(composition) | Phase::Submitting { composition, .. } => {
            let context = &composition.context;
            let draft = composition.draft();
            let _ = writeln!(out, "Member: {}", context.membership.code);
            if let Some(at) = context.registered_at() {
                let _ = writeln!(out, "Registered: {}", at.format("%Y-%m-%d"));
            }
            let _ = writeln!(
                out,
                "Points: {} ({} available)",
                context.points(),
                composition.available_points()
            );
            let _ = writeln!(
                out,
                "Selected: {} meal(s), {}{} menu value, {} points",
                composition.selection.len(),
                draft.total_price,
                context.currency_symbol(),
                draft.used_points()
            );
            let amount = if composition.amount_text.is_empty() {
                "-"
            } else {
                composition.amount_text.as_str()
            };
            let _ = writeln!(out, "Amount: {amount}");
        }
        Phase::Idle | Phase::Scanning => {}
    }
    out
}

// =============================================================================
// Console loop
// =============================================================================

pub struct Console {
    client: Arc<LoyaltyHttpClient>,
    controller: Arc<SessionController<LoyaltyHttpClient>>,
}

impl Console {
    pub fn new(
        client: Arc<LoyaltyHttpClient>,
        controller: Arc<SessionController<LoyaltyHttpClient>>,
    ) -> Self {
        Self { client, controller }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let printer = tokio::spawn(print_notices(self.controller.subscribe()));

        if !self.client.is_signed_in() {
            println!("Not signed in. Use `login <email> <password>`.");
        }
        println!("Type `help` for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match parse_command(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command).await,
                Err(e) => println!("{e}"),
            }
        }

        tracing::info!("Console closed");
        printer.abort();
        Ok(())
    }

    async fn execute(&self, command: Command) {
        // 失败已经通过通知打印，这里忽略返回值
        match command {
            Command::Login { email, password } => {
                match self.client.sign_in(&email, &password).await {
                    Ok(credential) => {
                        let who = credential.email.as_deref().unwrap_or(&email);
                        println!("Signed in as {who}");
                    }
                    Err(e) => println!("{}", render_sign_in_error(&e)),
                }
            }
            Command::Forgot(email) => match self.client.forgot_password(&email).await {
                Ok(()) => println!("Reset link sent to {}", email.trim()),
                Err(e) => println!("{}", failure_line(e.code(), e)),
            },
            Command::Scan => {
                let _ = self.controller.start_scan();
            }
            Command::Back => {
                let _ = self.controller.back();
            }
            Command::Code(raw) => {
                let trigger = if self.controller.snapshot().kind() == PhaseKind::Scanning {
                    Trigger::Camera
                } else {
                    Trigger::Manual
                };
                let controller = Arc::clone(&self.controller);
                tokio::spawn(async move {
                    let _ = controller.submit_code(trigger, &raw).await;
                });
            }
            Command::Menu => match self.controller.snapshot().composition() {
                Some(composition) => print!("{}", render_menu(composition)),
                None => println!("No member resolved yet"),
            },
            Command::Toggle(meal_id) => {
                let _ = self.controller.toggle(&meal_id);
            }
            Command::Amount(text) => {
                let _ = self.controller.edit_amount(&text);
            }
            Command::Submit(amount) => {
                let controller = Arc::clone(&self.controller);
                tokio::spawn(async move {
                    let _ = controller.submit_order(amount.as_deref()).await;
                });
            }
            Command::Rescan => {
                let _ = self.controller.rescan();
            }
            Command::Reset => self.controller.reset(),
            Command::Show => print!("{}", render_session(&self.controller.snapshot())),
            Command::SignOut => self.controller.sign_out().await,
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }
}

async fn print_notices(mut notices: broadcast::Receiver<Notice>) {
    loop {
        match notices.recv().await {
            Ok(notice) => {
                if let Some(line) = render_notice(&notice) {
                    println!("{line}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Notice printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loyalty_session::ledger::{self, SelectionSet};
    use loyalty_session::{OrderResult, SessionContext, SessionError};
    use rust_decimal::Decimal;
    use shared::{Meal, MembershipSummary, MenuGroup, RestaurantInfo};

    fn composition() -> Composition {
        let restaurant = RestaurantInfo {
            id: "7".into(),
            currency_code: Some("EUR".into()),
            menu_groups: vec![MenuGroup {
                id: None,
                label: None,
                meals: vec![
                    Meal {
                        id: "a".into(),
                        label: "Burger".into(),
                        price: Decimal::new(10, 0),
                        points_to_buy: Some(30),
                    },
                    Meal {
                        id: "tea".into(),
                        label: "Tea".into(),
                        price: Decimal::new(2, 0),
                        points_to_buy: None,
                    },
                ],
            }],
        };
        let membership = MembershipSummary {
            code: "MBR-1".into(),
            points: 100,
            user_id: "12".into(),
            restaurant_id: "7".into(),
        };
        let context = SessionContext::new(restaurant, membership, Vec::new());
        let (selection, _) = ledger::toggle(&SelectionSet::new(), &context, "a").unwrap();
        Composition {
            context,
            selection,
            amount_text: "15.50".into(),
        }
    }

    #[test]
    fn test_parse_commands() {
        let cases = [
            ("scan", Command::Scan),
            ("  BACK ", Command::Back),
            ("code  MBR-1 ", Command::Code("MBR-1".into())),
            ("code", Command::Code(String::new())),
            ("toggle a", Command::Toggle("a".into())),
            ("amount 15.50", Command::Amount("15.50".into())),
            ("amount", Command::Amount(String::new())),
            ("submit", Command::Submit(None)),
            ("submit 20", Command::Submit(Some("20".into()))),
            ("logout", Command::SignOut),
            ("forgot  cashier@example.com", Command::Forgot("cashier@example.com".into())),
            ("exit", Command::Quit),
            (
                "login cashier@example.com secret",
                Command::Login {
                    email: "cashier@example.com".into(),
                    password: "secret".into(),
                },
            ),
        ];
        for (line, expected) in cases {
            assert_eq!(parse_command(line), Ok(Some(expected)), "line: {line:?}");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("toggle"),
            Err(ParseError::Usage("toggle <meal-id>"))
        );
        assert!(matches!(
            parse_command("login only-email"),
            Err(ParseError::Usage(_))
        ));
        assert_eq!(parse_command("forgot"), Err(ParseError::Usage("forgot <email>")));
        assert_eq!(
            parse_command("fly away"),
            Err(ParseError::Unknown("fly".into()))
        );
    }

    #[test]
    fn test_render_menu_marks_selection() {
        let menu = render_menu(&composition());
        assert!(menu.contains("[x] a"));
        assert!(menu.contains("10€"));
        // meals without a points price are not composable
        assert!(!menu.contains("Tea"));
    }

    #[test]
    fn test_render_session() {
        let session = Session::new();
        assert_eq!(render_session(&session), "Phase: idle\n");
    }

    #[test]
    fn test_render_notices() {
        let mut order = OrderResult {
            order_amount: Decimal::new(1550, 2),
            used_points: 30,
            previous_points: 100,
            new_balance: Decimal::new(11550, 2),
            server_balance: None,
            order_id: Some("o-1".into()),
            currency_symbol: "€".into(),
        };
        assert_eq!(
            render_notice(&Notice::OrderCreated(order.clone())).as_deref(),
            Some("Order created: 15.50€ paid, 30 points used, balance 100 -> 115.50 (order o-1)")
        );

        order.server_balance = Some(85);
        assert_eq!(
            render_notice(&Notice::OrderCreated(order)).as_deref(),
            Some(
                "Order created: 15.50€ paid, 30 points used, balance 100 -> 115.50 (order o-1), \
                 server balance 85"
            )
        );

        let advisory = Notice::Failed(SessionError::InsufficientPoints {
            meal_id: "b".into(),
            required: 80,
            available: 70,
        });
        assert!(render_notice(&advisory).is_some_and(|line| line.starts_with("! ")));

        let rejected = render_notice(&Notice::Failed(SessionError::ScanRejected));
        assert_eq!(
            rejected.as_deref(),
            Some("x [scan/2001] A scan or submission is already in progress")
        );

        let expired = render_notice(&Notice::Failed(SessionError::AuthExpired));
        assert!(expired.is_some_and(|line| line.starts_with("x [auth/1003]")));

        let idle = Notice::PhaseChanged {
            from: PhaseKind::Ready,
            to: PhaseKind::Idle,
        };
        assert_eq!(render_notice(&idle), None);
    }

    #[test]
    fn test_render_sign_in_error() {
        assert_eq!(
            render_sign_in_error(&ClientError::InvalidCredentials),
            "x [auth/1002] Sign-in failed: Invalid email or password. \
             Forgot it? Use `forgot <email>`."
        );

        // 网络类错误不提示重置密码
        let line = render_sign_in_error(&ClientError::Config("bad url".into()));
        assert!(line.starts_with("x [system/9005] Sign-in failed:"));
        assert!(!line.contains("forgot"));
    }
}
