use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{
    get_config_path, save_config, Config, StoreConfig, ThemeMode, DEFAULT_BRANCH, DEFAULT_PATH,
    DEFAULT_REPO,
};
use crate::scoring::{
    points_table, validate_scoring, Rounding, ScoringConfig, DEFAULT_PIVOT_FRACTION,
    DEFAULT_TOP_MULTIPLIER,
};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(18));
    }
    println!();
}

pub(crate) fn parse_rounding(input: &str) -> Option<Rounding> {
    match input.to_lowercase().as_str() {
        "nearest" | "round" => Some(Rounding::Nearest),
        "floor" | "down" => Some(Rounding::Floor),
        "ceil" | "up" => Some(Rounding::Ceil),
        _ => None,
    }
}

pub(crate) fn parse_theme(input: &str) -> Option<ThemeMode> {
    match input.to_lowercase().as_str() {
        "auto" => Some(ThemeMode::Auto),
        "dark" => Some(ThemeMode::Dark),
        "light" => Some(ThemeMode::Light),
        _ => None,
    }
}

fn prompt_scoring() -> Result<ScoringConfig> {
    println!();
    typewriter("Points come from a hinged curve. The bottom part of your list scores 1, 2, 3... and the top part grows geometrically.");
    typewriter("The pivot fraction sets where the curve bends (0.5 = halfway up the list).");
    let pivot_fraction: f64 = loop {
        let input = prompt_with_default("Pivot fraction", &DEFAULT_PIVOT_FRACTION.to_string())?;
        match input.parse::<f64>() {
            Ok(v) if (0.0..=1.0).contains(&v) => break v,
            _ => println!("  Invalid: must be a number between 0 and 1. Try again."),
        }
    };

    println!();
    typewriter("The top multiplier is how many times the pivot score your #1 coaster earns.");
    let top_multiplier: f64 = loop {
        let input = prompt_with_default("Top multiplier", &DEFAULT_TOP_MULTIPLIER.to_string())?;
        match input.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 1.0 => break v,
            _ => println!("  Invalid: must be a number >= 1. Try again."),
        }
    };

    println!();
    let rounding = loop {
        let input = prompt_with_default("Rounding (nearest, floor, ceil)", "nearest")?;
        match parse_rounding(&input) {
            Some(r) => break r,
            None => println!("  Invalid: choose nearest, floor or ceil."),
        }
    };

    let scoring = ScoringConfig {
        pivot_fraction: Some(pivot_fraction),
        top_multiplier: Some(top_multiplier),
        rounding: Some(rounding),
    };
    if let Err(errors) = validate_scoring(&scoring) {
        anyhow::bail!("Invalid scoring settings: {}", errors.join("; "));
    }

    let preview: Vec<String> = points_table(10, &scoring)
        .iter()
        .map(|p| p.to_string())
        .collect();
    println!("  A 10-coaster list would score: {}", preview.join(", "));
    Ok(scoring)
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("Coaster Book Configuration Wizard");
    println!("=================================");
    println!();

    // 1. Data file location
    typewriter("Your rankings live in a JSON file in a GitHub repository you own.");
    let owner = loop {
        let input = prompt("GitHub owner (user or organization): ")?;
        if !input.is_empty() {
            break input;
        }
        println!("  Owner is required.");
    };
    let repo = prompt_with_default("Repository", DEFAULT_REPO)?;
    let branch = prompt_with_default("Branch", DEFAULT_BRANCH)?;
    let path = prompt_with_default("Path to data file", DEFAULT_PATH)?;

    println!();
    typewriter("If you run a proxy that holds the GitHub token for you, enter its URL. Otherwise leave it blank and a token is used directly.");
    let proxy = prompt("Proxy URL (optional): ")?;
    let proxy_url = if proxy.is_empty() { None } else { Some(proxy) };

    // 2. Scoring
    println!();
    let scoring = if prompt_yes_no("Configure scoring? (n accepts defaults)", false)? {
        Some(prompt_scoring()?)
    } else {
        None
    };

    // 3. Theme
    println!();
    let theme = loop {
        let input = prompt_with_default("Theme (auto, dark, light)", "auto")?;
        match parse_theme(&input) {
            Some(t) => break t,
            None => println!("  Invalid: choose auto, dark or light."),
        }
    };

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        store: StoreConfig {
            owner,
            repo,
            branch,
            path,
            proxy_url,
            api_url: None,
        },
        scoring,
        theme,
    };
    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    if config.store.proxy_url.is_none() {
        typewriter("You'll be asked for a GitHub token with contents read/write access on first run. It is stored in your system keyring.");
    }
    println!("Run `coasterbook` to see your rankings, or `coasterbook edit` to reorder them.");

    Ok(())
}
