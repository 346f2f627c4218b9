use futures::future::join_all;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::app::{navigate, AppContext, Navigation, Result, Route, UttarError};
use crate::domain::{Role, Session, TargetKey, ToggleKind, ToggleTarget};
use crate::sync::{SyncNotice, ToggleOutcome};

pub fn login(ctx: &AppContext, token: &str, username: &str, role: Role) -> Result<()> {
    let session = Session::new(token.to_string(), username.to_string(), role);
    ctx.session.login(session)?;
    println!("Logged in as {} ({})", username, role.as_str());
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    if !ctx.session.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    ctx.session.logout()?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.session.current() {
        Some(s) => println!(
            "{} ({}), logged in {}",
            s.username,
            s.role.as_str(),
            s.issued_at.format("%Y-%m-%d %H:%M")
        ),
        None => println!("Not logged in"),
    }
    Ok(())
}

pub fn open(ctx: &AppContext, route: &str) -> Result<()> {
    let route: Route = route.parse().map_err(UttarError::Other)?;
    let session = ctx.session.current();
    match navigate(session.as_ref(), route) {
        Navigation::Render(r) => println!("{}", r),
        Navigation::Redirect(r) => println!("{} -> redirected to {}", route, r),
    }
    Ok(())
}

/// Seeds a target from the given server state and fires `clicks` toggles at once.
pub async fn toggle(
    ctx: &AppContext,
    kind: ToggleKind,
    id: &str,
    active: bool,
    count: u64,
    clicks: usize,
) -> Result<()> {
    if !ctx.session.is_authenticated() {
        return Err(UttarError::NotAuthenticated);
    }

    let key = TargetKey::new(kind, id);
    let engine = ctx.engine.clone();
    let mut notices = engine.subscribe();
    engine.track(&key, active, count);

    let outcomes = join_all((0..clicks.max(1)).map(|_| engine.toggle(&key))).await;

    let mut settled = None;
    let mut coalesced = 0;
    let mut suppressed = 0;
    for outcome in outcomes {
        match outcome? {
            ToggleOutcome::Settled {
                requests, target, ..
            } => settled = Some((requests, target)),
            ToggleOutcome::Coalesced => coalesced += 1,
            ToggleOutcome::Suppressed => suppressed += 1,
        }
    }

    for notice in drain_notices(&mut notices) {
        let action = if notice.rolled_back {
            "rolled back"
        } else {
            "kept"
        };
        eprintln!("  ! {}: {} ({})", notice.key, notice.message, action);
    }

    if let Some((requests, target)) = settled {
        println!(
            "{} request(s) sent, {} click(s) coalesced, {} suppressed",
            requests, coalesced, suppressed
        );
        if let Some(target) = target {
            print_target(&target);
        }
    }

    if !ctx.session.is_authenticated() {
        eprintln!("Session expired; run `uttar login` again");
    }

    Ok(())
}

/// Collects every notice still buffered, skipping past any the receiver lagged on.
fn drain_notices(notices: &mut broadcast::Receiver<SyncNotice>) -> Vec<SyncNotice> {
    let mut drained = Vec::new();
    loop {
        match notices.try_recv() {
            Ok(notice) => drained.push(notice),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!("{} sync notice(s) dropped", skipped);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    drained
}

fn print_target(target: &ToggleTarget) {
    let state = match (target.key.kind, target.is_active) {
        (ToggleKind::QuestionBookmark, true) => "bookmarked",
        (ToggleKind::QuestionBookmark, false) => "not bookmarked",
        (_, true) => "liked",
        (_, false) => "not liked",
    };
    if target.key.kind.is_counted() {
        println!("{}: {} ({} likes)", target.key, state, target.count);
    } else {
        println!("{}: {}", target.key, state);
    }
}
