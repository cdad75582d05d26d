use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Levels of stealth applied to the browser session.
pub enum StealthProfile {
    Lightweight,
    Balanced,
    Maximum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// User agent, viewport, and locale presented for one session.
pub struct UserAgentProfile {
    pub user_agent: String,
    pub viewport: (u32, u32),
    pub platform: String,
    pub languages: Vec<String>,
}

fn windows_chrome() -> UserAgentProfile {
    UserAgentProfile {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
        viewport: (1920, 1080),
        platform: "Win32".to_string(),
        languages: vec!["en-US".to_string(), "en".to_string()],
    }
}

fn mac_chrome() -> UserAgentProfile {
    UserAgentProfile {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string(),
        viewport: (1440, 900),
        platform: "MacIntel".to_string(),
        languages: vec!["en-US".to_string(), "en".to_string()],
    }
}

/// Pick the profile for a new session. Lightweight sessions always present
/// the same desktop; the others rotate.
pub fn session_profile(profile: StealthProfile) -> UserAgentProfile {
    match profile {
        StealthProfile::Lightweight => windows_chrome(),
        StealthProfile::Balanced | StealthProfile::Maximum => [windows_chrome(), mac_chrome()]
            .into_iter()
            .choose(&mut rand::thread_rng())
            .unwrap_or_else(windows_chrome),
    }
}

/// Chrome command-line arguments for a profile and fingerprint.
pub fn launch_arguments(
    profile: StealthProfile,
    user: &UserAgentProfile,
    headless: bool,
) -> Vec<String> {
    let mut args = vec![
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--disable-extensions".to_string(),
        format!("--user-agent={}", user.user_agent),
        format!("--window-size={},{}", user.viewport.0, user.viewport.1),
        format!("--lang={}", user.languages.join(",")),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }
    if headless || profile == StealthProfile::Maximum {
        args.push("--disable-gpu".to_string());
    }
    args
}

const CORE_EVASIONS: &str = r#"
    Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
    Object.defineProperty(navigator, 'plugins', { get: () => [1,2,3] });
    Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
    if (!window.chrome) window.chrome = { runtime: {} };
"#;

const CANVAS_EVASIONS: &str = r#"
    const getContext = HTMLCanvasElement.prototype.getContext;
    HTMLCanvasElement.prototype.getContext = function(type, ...args) {
        const ctx = getContext.call(this, type, ...args);
        if (type === '2d' && ctx) {
            const origToDataURL = this.toDataURL;
            this.toDataURL = function(...a) {
                const img = ctx.getImageData(0, 0, this.width, this.height);
                for (let i = 0; i < img.data.length; i += 4) {
                    if (Math.random() < 0.001) img.data[i] += Math.random() < 0.5 ? -1 : 1;
                }
                ctx.putImageData(img, 0, 0);
                return origToDataURL.call(this, ...a);
            };
        }
        return ctx;
    };
"#;

const WEBGL_EVASIONS: &str = r#"
    const getParameter = WebGLRenderingContext.prototype.getParameter;
    WebGLRenderingContext.prototype.getParameter = function(parameter) {
        if (parameter === 37445) return 'Intel Inc.';
        if (parameter === 37446) return 'Intel Iris OpenGL Engine';
        return getParameter.call(this, parameter);
    };
"#;

/// Scripts injected after every navigation, cheapest first.
pub fn evasion_scripts(profile: StealthProfile, user: &UserAgentProfile) -> Vec<String> {
    let mut scripts = vec![CORE_EVASIONS.to_string()];
    if matches!(profile, StealthProfile::Balanced | StealthProfile::Maximum) {
        scripts.push(CANVAS_EVASIONS.to_string());
    }
    if profile == StealthProfile::Maximum {
        scripts.push(WEBGL_EVASIONS.to_string());
        scripts.push(format!(
            "Object.defineProperty(navigator, 'platform', {{ get: () => '{}' }});",
            user.platform
        ));
    }
    scripts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_sessions_get_headless_flags() {
        let user = session_profile(StealthProfile::Lightweight);
        let args = launch_arguments(StealthProfile::Lightweight, &user, true);
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args.iter().any(|a| a == "--disable-gpu"));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
    }

    #[test]
    fn evasions_grow_with_profile() {
        let user = mac_chrome();
        assert_eq!(evasion_scripts(StealthProfile::Lightweight, &user).len(), 1);
        assert_eq!(evasion_scripts(StealthProfile::Balanced, &user).len(), 2);
        let max = evasion_scripts(StealthProfile::Maximum, &user);
        assert_eq!(max.len(), 4);
        assert!(max[3].contains("MacIntel"));
    }
}
