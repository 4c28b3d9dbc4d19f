use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::json;
use thirtyfour::prelude::*;
use thirtyfour::Key;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Settings;

const LOGIN_ATTEMPTS: u32 = 3;
const SETTLE: Duration = Duration::from_secs(5);
const RETRY_PAUSE: Duration = Duration::from_secs(2);
const LOGIN_MARKER_TIMEOUT: Duration = Duration::from_secs(10);
const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL: Duration = Duration::from_millis(500);

const USER_FIELD: &str = "UserID";
const PASSWORD_FIELD: &str = "passform3";
// Only present once signed in; probing for it confirms the login took.
const LOGOUT_MARKER: &str = "a[href='/sicurezza/logout.html']";
const TRANSLATE_PROMPT: &str = "//span[text()='Translate']";

/// Start a fresh headless Chrome session against the WebDriver endpoint.
/// The profile is set up to auto-translate the supplier's Italian markup.
pub async fn connect(settings: &Settings) -> Result<WebDriver> {
    let mut caps = DesiredCapabilities::chrome();
    caps.set_headless()?;
    caps.add_arg("--disable-gpu")?;
    caps.add_arg("--no-sandbox")?;
    caps.add_arg("--disable-dev-shm-usage")?;
    caps.add_arg("--lang=en")?;
    caps.add_experimental_option(
        "prefs",
        json!({
            "intl.accept_languages": "en,en-US",
            "translate_whitelists": { "it": "en" },
            "translate": { "enabled": true },
        }),
    )?;

    WebDriver::new(&settings.webdriver_url, caps)
        .await
        .with_context(|| format!("could not start a browser session at {}", settings.webdriver_url))
}

/// Sign in, retrying up to LOGIN_ATTEMPTS times. Exhausting the attempts is
/// fatal for the calling job only.
pub async fn login(driver: &WebDriver, settings: &Settings) -> Result<()> {
    let login_url = settings.login_url();

    for attempt in 1..=LOGIN_ATTEMPTS {
        match attempt_login(driver, settings, &login_url).await {
            Ok(true) => {
                info!("login successful");
                return Ok(());
            }
            Ok(false) => warn!("login attempt {}/{} not confirmed, retrying", attempt, LOGIN_ATTEMPTS),
            Err(e) => warn!("login attempt {}/{} failed: {:#}", attempt, LOGIN_ATTEMPTS, e),
        }
        sleep(RETRY_PAUSE).await;
    }

    bail!("authentication failed after {} attempts", LOGIN_ATTEMPTS)
}

async fn attempt_login(driver: &WebDriver, settings: &Settings, login_url: &str) -> Result<bool> {
    driver.goto(login_url).await?;
    sleep(SETTLE).await;

    let user_input = driver
        .find(By::Id(USER_FIELD))
        .await
        .context("login form has no user field")?;
    user_input.send_keys(settings.login.as_str()).await?;

    let password_input = driver
        .find(By::Id(PASSWORD_FIELD))
        .await
        .context("login form has no password field")?;
    password_input.send_keys(settings.password.as_str()).await?;
    password_input.send_keys(Key::Enter).await?;

    sleep(SETTLE).await;

    let confirmed = driver
        .query(By::Css(LOGOUT_MARKER))
        .wait(LOGIN_MARKER_TIMEOUT, POLL)
        .first()
        .await
        .is_ok();
    Ok(confirmed)
}

/// Best-effort: click the browser's translate prompt if it shows up, then
/// give the DOM time to swap in the English text. Absence is normal (page
/// already translated, or the prompt never rendered) and never an error.
pub async fn translate_page(driver: &WebDriver) {
    match driver
        .query(By::XPath(TRANSLATE_PROMPT))
        .wait(TRANSLATE_TIMEOUT, POLL)
        .first()
        .await
    {
        Ok(prompt) => {
            if let Err(e) = prompt.click().await {
                debug!("translate prompt found but not clickable: {}", e);
                return;
            }
            debug!("translate prompt clicked");
            sleep(SETTLE).await;
        }
        Err(_) => debug!("translate prompt not found, continuing untranslated"),
    }
}
