//! Interactive manual login.

use std::time::Duration;

use bulwark_common::{BulwarkError, LoginStatus};

use crate::console::Prompter;
use crate::engine::DefenseEngine;
use crate::wait::{Waiter, countdown_bar, update_countdown};

/// Read usernames and passwords until input ends or the user types `q`.
///
/// A username that owes a CAPTCHA must solve it before a password is asked
/// for. After a lockout the session waits it out, then demands a CAPTCHA.
pub async fn manual_login<I, W>(
    engine: &mut DefenseEngine,
    input: &mut I,
    waiter: &mut W,
    show_progress: bool,
) -> Result<(), BulwarkError>
where
    I: Prompter,
    W: Waiter,
{
    println!("\nLogin Section");
    println!("{}", "=".repeat(30));

    loop {
        println!("\nTotal login attempts: {}", engine.total_attempts());

        let Some(username) = input.prompt("\nEnter username (or 'q' to quit): ").await else {
            return Ok(());
        };
        let username = username.trim().to_string();
        if username.eq_ignore_ascii_case("q") {
            return Ok(());
        }
        if username.is_empty() {
            continue;
        }

        if engine.is_captcha_required(&username) {
            println!("\nCAPTCHA required to verify you're not a robot!");
            engine.solve_captcha(&username, input).await;
            continue;
        }

        let Some(password) = input.prompt("Enter password: ").await else {
            return Ok(());
        };

        let status = engine.verify_login(&username, &password);
        println!("\nResult: {}", status);

        if let LoginStatus::Locked { .. } = status {
            wait_for_lockout(engine, &username, input, waiter, show_progress).await?;
        }
    }
}

/// Block until `username` is no longer locked, then require and present a CAPTCHA
async fn wait_for_lockout<I, W>(
    engine: &mut DefenseEngine,
    username: &str,
    input: &mut I,
    waiter: &mut W,
    show_progress: bool,
) -> Result<(), BulwarkError>
where
    I: Prompter,
    W: Waiter,
{
    while let Some(remaining) = engine.check_account_lockout(username) {
        let total = Duration::from_secs(remaining);
        let bar = countdown_bar(total, show_progress);
        let result = waiter
            .wait(total, &mut |left| update_countdown(&bar, left))
            .await;
        bar.finish_and_clear();
        result?;
    }

    println!("\nLockout period ended. Solve CAPTCHA and you can try again.");
    engine.require_captcha(username);
    engine.solve_captcha(username, input).await;
    Ok(())
}
