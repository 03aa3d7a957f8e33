use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use narrative_lab::config::secrets::{resolve_api_key, Secrets};
use narrative_lab::config::settings::{LabSettings, Provider};
use narrative_lab::config::settings_io;
use narrative_lab::config::templates::{resolve_pack, TemplatePack, BUILTIN_PACKS};
use narrative_lab::engine::scene_parser::{parse_scene, SceneLine};
use narrative_lab::model::character::{Antagonist, CharacterProfile, Rulebook};
use narrative_lab::model::message::Role;
use narrative_lab::{
    Dramaturg, LabCommand, LabError, LabResponse, LlmClient, Session, SessionState, TextGenerator,
};

#[derive(Debug, Parser)]
#[command(
    name = "narrative-lab",
    version,
    about = "Test a character arc against a rulebook, then interview the character"
)]
struct Args {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    provider: Option<Provider>,

    #[arg(long, global = true)]
    model: Option<String>,

    /// Built-in template pack
    #[arg(long, global = true)]
    templates: Option<String>,

    /// TOML template pack file
    #[arg(long, global = true)]
    template_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive session (default)
    Run,
    /// Check that the text service is reachable
    Check,
    /// Write default settings and the built-in template packs
    InitConfig {
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings_path = args.settings.clone().unwrap_or_else(settings_io::settings_path);
    let mut settings = settings_io::load_settings(&settings_path);
    if let Some(provider) = args.provider {
        settings.provider = provider;
    }
    if let Some(model) = args.model {
        settings.model = Some(model);
    }
    if let Some(templates) = args.templates {
        settings.template_pack = templates;
    }
    if let Some(path) = args.template_file {
        settings.template_file = Some(path);
    }

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(&settings),
        Command::Check => {
            let api_key = resolve_api_key(settings.provider, |var| std::env::var(var).ok())?;
            let client = LlmClient::from_settings(&settings, api_key.as_deref())?;
            println!("{}", client.check_connection()?);
            Ok(())
        }
        Command::InitConfig { force } => init_config(&settings_path, &settings, force),
    }
}

fn init_config(settings_path: &Path, settings: &LabSettings, force: bool) -> Result<()> {
    if settings_path.exists() && !force {
        println!("{} exists, skipping (use --force)", settings_path.display());
    } else {
        settings_io::save_settings(settings_path, settings)?;
        println!("wrote {}", settings_path.display());
    }

    let dir = settings_path
        .parent()
        .map(|p| p.join("templates"))
        .unwrap_or_else(settings_io::templates_dir);
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    for name in BUILTIN_PACKS {
        let pack = TemplatePack::builtin(name).context("built-in pack missing")?;
        let path = dir.join(format!("{name}.toml"));
        if path.exists() && !force {
            println!("{} exists, skipping", path.display());
            continue;
        }
        fs::write(&path, pack.to_toml_string()?)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

/* =========================
   Interactive session
   ========================= */

#[derive(Debug, Clone, Copy)]
enum Field {
    Name,
    Goal,
    Truth,
    Need,
    AntagonistName,
    Belief,
}

impl Field {
    fn parse(group: &str, key: &str) -> Option<Self> {
        match (group, key) {
            ("set", "name") => Some(Field::Name),
            ("set", "goal") => Some(Field::Goal),
            ("set", "truth") => Some(Field::Truth),
            ("set", "need") => Some(Field::Need),
            ("antagonist", "name") => Some(Field::AntagonistName),
            ("antagonist", "belief") => Some(Field::Belief),
            _ => None,
        }
    }
}

enum Input {
    Help,
    Quit,
    Show,
    Set(Field, String),
    Rulebook(PathBuf),
    Assess,
    Duel,
    Text(String),
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Input::Text(line.to_string());
    };

    let (cmd, rest) = command
        .split_once(' ')
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((command, ""));

    match cmd {
        "help" => Input::Help,
        "quit" | "q" => Input::Quit,
        "show" => Input::Show,
        "assess" => Input::Assess,
        "duel" => Input::Duel,
        "rulebook" => Input::Rulebook(PathBuf::from(rest)),
        "set" | "antagonist" => {
            let (key, value) = rest
                .split_once(' ')
                .map(|(k, v)| (k, v.trim()))
                .unwrap_or((rest, ""));
            match Field::parse(cmd, key) {
                Some(field) => Input::Set(field, value.to_string()),
                None => Input::Unknown(line.to_string()),
            }
        }
        _ => Input::Unknown(line.to_string()),
    }
}

/// Form values the user is editing. Only copied into the session by an
/// assessment.
#[derive(Default)]
struct Workbench {
    profile: CharacterProfile,
    antagonist: Antagonist,
    rulebook: Option<Rulebook>,
}

impl Workbench {
    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.profile.name = value,
            Field::Goal => self.profile.conscious_goal = value,
            Field::Truth => self.profile.hidden_truth = value,
            Field::Need => self.profile.inner_need = value,
            Field::AntagonistName => self.antagonist.name = value,
            Field::Belief => self.antagonist.opposing_belief = value,
        }
    }
}

fn run(settings: &LabSettings) -> Result<()> {
    let secrets = Secrets::from_env(settings.provider)?;
    let pack = resolve_pack(settings)?;
    let client = LlmClient::from_settings(settings, secrets.api_key())?;
    let lab = Dramaturg::new(client, &pack, secrets.access_code())?;

    let mut session = Session::new();
    let mut bench = Workbench::default();

    println!("The Universal Dramaturg (template pack `{}` v{})", pack.name, pack.version);
    println!("Enter the access code.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print_prompt(&session)?;
        let Some(line) = lines.next() else { break };
        let line = line?;

        if session.state() == SessionState::Unauthenticated {
            match lab.authenticate(&mut session, line.trim()) {
                Ok(()) => println!("Access granted. Type /help for commands."),
                Err(err) => eprintln!("{err}"),
            }
            continue;
        }

        match parse_input(&line) {
            Input::Quit => break,
            Input::Help => print_help(),
            Input::Show => show(&session, &bench),
            Input::Set(field, value) => bench.set(field, value),
            Input::Rulebook(path) => match Rulebook::from_path(&path) {
                Ok(rulebook) => {
                    println!("Loaded rulebook {}", rulebook.file_name);
                    bench.rulebook = Some(rulebook);
                }
                Err(err) => eprintln!("{err}"),
            },
            Input::Assess => {
                let Some(rulebook) = bench.rulebook.clone() else {
                    eprintln!("{}", LabError::MissingInput("rulebook"));
                    continue;
                };
                println!("Consulting {}...", rulebook.file_name);
                let command = LabCommand::Assess {
                    rulebook,
                    profile: bench.profile.clone(),
                };
                respond(&lab, &mut session, &bench.antagonist, command);
            }
            Input::Duel => {
                println!("Writing scene...");
                let command = LabCommand::Duel(bench.antagonist.clone());
                respond(&lab, &mut session, &bench.antagonist, command);
            }
            Input::Text(text) if text.is_empty() => {}
            Input::Text(text) => {
                respond(&lab, &mut session, &bench.antagonist, LabCommand::Chat(text))
            }
            Input::Unknown(line) => eprintln!("unknown command `{line}`, try /help"),
        }
    }

    Ok(())
}

fn respond<G: TextGenerator>(
    lab: &Dramaturg<G>,
    session: &mut Session,
    antagonist: &Antagonist,
    command: LabCommand,
) {
    match lab.handle(session, command) {
        Ok(LabResponse::Verdict(assessment)) => {
            if assessment.approved {
                println!("Character Approved!");
            } else {
                println!("Character needs revision.");
            }
            println!("\n{}\n", assessment.text);
        }
        Ok(LabResponse::Scene(scene)) => {
            println!("\n--- The Scene ---");
            let speakers = [character_name(session), antagonist.name.as_str()];
            for line in parse_scene(&scene, &speakers) {
                match line {
                    SceneLine::Dialogue { speaker, text } => println!("{speaker}: {text}"),
                    SceneLine::Narration(text) => println!("  {text}"),
                }
            }
            println!();
        }
        Ok(LabResponse::Reply(reply)) => {
            println!("{}: {}", character_name(session), reply.content);
        }
        Ok(LabResponse::Authenticated) => {}
        Err(err) => eprintln!("Error: {err}"),
    }
}

fn character_name(session: &Session) -> &str {
    session
        .profile()
        .map(|p| p.name.as_str())
        .unwrap_or("character")
}

fn print_prompt(session: &Session) -> io::Result<()> {
    match session.state() {
        SessionState::Unauthenticated => print!("code> "),
        SessionState::Unapproved => print!("lab> "),
        SessionState::Approved => print!("ask {}> ", character_name(session)),
    }
    io::stdout().flush()
}

fn print_help() {
    println!(
        "Step 1: define the character
  /set name|goal|truth|need <value>
  /rulebook <path to .txt>
  /assess
Step 2: the conflict test (after approval)
  /antagonist name|belief <value>
  /duel
Step 3: the interview (after approval)
  type a question and press enter
Other
  /show   current values, verdict and transcript
  /quit"
    );
}

fn show(session: &Session, bench: &Workbench) {
    let p = &bench.profile;
    println!(
        "Character: {} | Goal: {} | Truth: {} | Need: {}",
        p.name, p.conscious_goal, p.hidden_truth, p.inner_need
    );
    println!(
        "Antagonist: {} | Belief: {}",
        bench.antagonist.name, bench.antagonist.opposing_belief
    );
    match &bench.rulebook {
        Some(rulebook) => println!("Rulebook: {}", rulebook.file_name),
        None => println!("Rulebook: none"),
    }
    if let Some(verdict) = session.verdict_text() {
        println!("\n{verdict}\n");
    }
    for turn in session.chat_log().iter() {
        let who = match turn.role() {
            Role::User => "you",
            Role::Character => character_name(session),
        };
        println!("{who}: {}", turn.content());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_chat_message() {
        assert!(matches!(
            parse_input("  Where were you that night?  "),
            Input::Text(text) if text == "Where were you that night?"
        ));
        assert!(matches!(parse_input("   "), Input::Text(text) if text.is_empty()));
    }

    #[test]
    fn slash_commands_parse() {
        assert!(matches!(parse_input("/help"), Input::Help));
        assert!(matches!(parse_input("/q"), Input::Quit));
        assert!(matches!(parse_input("/assess"), Input::Assess));
        assert!(matches!(parse_input("/duel"), Input::Duel));
        assert!(matches!(
            parse_input("/rulebook  books/poetics.txt"),
            Input::Rulebook(path) if path == Path::new("books/poetics.txt")
        ));
        assert!(matches!(parse_input("/dance"), Input::Unknown(line) if line == "/dance"));
    }

    #[test]
    fn set_commands_keep_the_whole_value() {
        assert!(matches!(
            parse_input("/set need   To forgive herself"),
            Input::Set(Field::Need, value) if value == "To forgive herself"
        ));
        assert!(matches!(
            parse_input("/antagonist belief The past should remain buried."),
            Input::Set(Field::Belief, value) if value == "The past should remain buried."
        ));
        assert!(matches!(parse_input("/set belief x"), Input::Unknown(_)));
        assert!(matches!(parse_input("/antagonist goal x"), Input::Unknown(_)));
    }

    #[test]
    fn workbench_routes_fields() {
        let mut bench = Workbench::default();
        for line in [
            "/set name Ingrid",
            "/set goal Win the case",
            "/set truth She forged the will",
            "/set need To be believed",
            "/antagonist name The Judge",
            "/antagonist belief Rules over mercy",
        ] {
            let Input::Set(field, value) = parse_input(line) else {
                panic!("`{line}` did not parse as a field update");
            };
            bench.set(field, value);
        }

        assert_eq!(
            bench.profile,
            CharacterProfile {
                name: "Ingrid".into(),
                conscious_goal: "Win the case".into(),
                hidden_truth: "She forged the will".into(),
                inner_need: "To be believed".into(),
            }
        );
        assert_eq!(bench.antagonist.name, "The Judge");
        assert_eq!(bench.antagonist.opposing_belief, "Rules over mercy");
        assert!(bench.rulebook.is_none());
    }
}
