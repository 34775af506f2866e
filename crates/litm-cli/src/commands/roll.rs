use std::path::Path;

use colored::Colorize;
use litm_core::dice::{self, Outcome};
use litm_core::{Authority, Consequences, ExperienceGain, RollCommit, RollType};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{build_session, load_config, load_session};

pub struct RollArgs<'a> {
    pub session: &'a Path,
    pub config: Option<&'a Path>,
    pub seed: Option<u64>,
    pub roll_type: &'a str,
    pub title: &'a str,
    pub gm: bool,
}

pub fn run(args: &RollArgs<'_>) -> Result<(), String> {
    let roll_type: RollType = args
        .roll_type
        .parse()
        .map_err(|e: litm_core::LitmError| e.to_string())?;
    let file = load_session(args.session)?;
    let config = load_config(args.config)?;
    let mut session = build_session(file, config.clone());
    let themes = session.themes().to_vec();

    let authority = Authority {
        is_gm: args.gm,
        approved: false,
    };
    let request = session.request(args.title, roll_type);
    let mut sink: Vec<RollCommit> = Vec::new();
    let commit = session
        .commit(request, authority, &mut sink)
        .map_err(|e| e.to_string())?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let result = dice::roll(commit.total_power, roll_type, &mut rng);
    tracing::debug!(seed = ?args.seed, dice = ?result.dice, "dice rolled");

    println!(
        "  {} {}",
        commit.title.bold(),
        format!("({roll_type}, power {:+})", commit.total_power).dimmed()
    );
    println!(
        "  dice {} + {} {:+} = {}",
        result.dice[0],
        result.dice[1],
        result.power,
        result.total.to_string().bold()
    );
    let outcome = result.outcome.to_string();
    let outcome = match result.outcome {
        Outcome::Success => outcome.green().bold(),
        Outcome::SuccessWithConsequences => outcome.yellow().bold(),
        Outcome::Consequences => outcome.red().bold(),
    };
    println!("  {outcome}");
    if result.spendable_power > 0 {
        println!("  power to spend: {}", result.spendable_power);
    }

    let fellowship = session.shared().read().fellowship;
    let consequences = Consequences::of(&commit, &themes, &fellowship, &config);
    print_consequences(&consequences);
    Ok(())
}

fn print_consequences(consequences: &Consequences) {
    if consequences == &Consequences::default() {
        return;
    }
    println!();
    println!("  {}", "After the Roll".bold().underline());
    for tag in &consequences.sheet_burns {
        println!("  {}  {}", "BURN".red().bold(), tag.name);
    }
    for tag in &consequences.story_burns {
        println!("  {}  {} {}", "BURN".red().bold(), tag.name, "(story)".dimmed());
    }
    match &consequences.experience {
        Some(ExperienceGain::Theme(id)) => println!("  {}  theme {id}", "XP".cyan().bold()),
        Some(ExperienceGain::Fellowship) => println!("  {}  fellowship", "XP".cyan().bold()),
        None => {}
    }
}
