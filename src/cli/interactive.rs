//! Interactive menu and manual count entry.
//!
//! Everything reads through a [`Prompt`] so the flows can be driven from
//! any `BufRead`/`Write` pair, not only the terminal.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{console_reporter, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::{
    config_write_path, save_config, SpriteConfig, SpriteEntry, AUTO_CONFIG_FILE,
    DEFAULT_CONFIG_FILE, MANUAL_CONFIG_FILE,
};
use crate::detect::{detect_file, DetectionMethod};
use crate::split::{
    discover_images, generate_config, relative_key, ParallelSplit, SplitContext, SplitError,
    SplitRun,
};

const DEFAULT_INPUT_DIR: &str = "input";
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Line-based question and answer over a reader and a writer.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Create a prompt reading answers from `input`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line.
    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    /// Ask a question and return the trimmed answer.
    ///
    /// End of input is an `UnexpectedEof` error so callers that re-prompt
    /// cannot loop forever.
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}: ", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(answer.trim().to_string())
    }

    /// Ask a question, using `default` for an empty answer.
    pub fn ask_or(&mut self, question: &str, default: &str) -> io::Result<String> {
        let answer = self.ask(question)?;
        Ok(if answer.is_empty() { default.to_string() } else { answer })
    }

    /// Get the writer.
    pub fn output(&self) -> &W {
        &self.output
    }
}

/// Modes offered by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Detect every count and split right away
    AutoSplit,
    /// Enter every count by hand
    Manual,
    /// Split using an existing config file
    FromConfig,
    /// Only write a generated config
    GenerateConfig,
}

impl MenuChoice {
    /// Parse a menu answer (`1` to `4`).
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim() {
            "1" => Some(MenuChoice::AutoSplit),
            "2" => Some(MenuChoice::Manual),
            "3" => Some(MenuChoice::FromConfig),
            "4" => Some(MenuChoice::GenerateConfig),
            _ => None,
        }
    }
}

/// Ask for a count for every image below `input_dir`.
///
/// An empty answer accepts the detected suggestion. Anything else must be a
/// whole number of 0 or more; invalid answers are asked again.
pub fn collect_manual_config<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    input_dir: &Path,
    method: DetectionMethod,
) -> Result<SpriteConfig, SplitError> {
    let files = discover_images(input_dir)?;
    let mut config = SpriteConfig::new();
    if files.is_empty() {
        prompt.say(&format!("No image files in '{}'", input_dir.display()))?;
        return Ok(config);
    }

    prompt.say(&format!("Found {} files", files.len()))?;
    prompt.say("Enter the sprite count of each file (Enter = suggested):")?;
    prompt.say(&"-".repeat(50))?;

    for path in &files {
        let key = relative_key(input_dir, path)?;
        let suggested = detect_file(path, method).count();
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let entry = loop {
            let answer = prompt.ask(&format!("{} [suggested: {}]", key, suggested))?;
            if answer.is_empty() {
                break SpriteEntry::detected(suggested, size);
            }
            match answer.parse::<i64>() {
                Ok(n) if n < 0 => prompt.say("   Count must be 0 or more")?,
                Ok(n) => match u32::try_from(n) {
                    Ok(count) => break SpriteEntry::manual(count, size),
                    Err(_) => prompt.say("   Count is too large")?,
                },
                Err(_) => prompt.say("   Enter a whole number")?,
            }
        };
        config.insert(key, entry);
    }

    Ok(config)
}

fn split_with_config<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    input_dir: &Path,
    output_dir: &Path,
    config_path: &Path,
    fresh_config: bool,
    verbose: bool,
) -> Result<u8, SplitError> {
    let context = SplitContext::new(input_dir, output_dir)
        .with_config_path(config_path)
        .with_verbose(verbose);
    let mut run = SplitRun::new(context).with_reporter(Box::new(console_reporter(verbose)));
    if fresh_config {
        run = run.with_fresh_config();
    }
    let result = run.run()?;

    if result.is_success() {
        Ok(EXIT_SUCCESS)
    } else {
        for failure in result.failures() {
            prompt.say(&format!("{}: {}", failure.key, failure.status))?;
        }
        Ok(EXIT_ERROR)
    }
}

/// Manual mode: collect counts, save them and optionally split right away.
///
/// The input folder is asked for when `input_dir` is `None`. Returns the
/// process exit code.
pub fn manual_mode<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    input_dir: Option<&Path>,
    method: DetectionMethod,
    verbose: bool,
) -> Result<u8, SplitError> {
    prompt.say("MANUAL CONFIGURATION MODE")?;
    prompt.say(&"=".repeat(50))?;

    let input_dir = match input_dir {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from(prompt.ask_or("Input folder", DEFAULT_INPUT_DIR)?),
    };

    let config = collect_manual_config(prompt, &input_dir, method)?;
    if config.is_empty() {
        return Ok(EXIT_SUCCESS);
    }

    let config_path = config_write_path(&input_dir, Path::new(MANUAL_CONFIG_FILE));
    save_config(&config, &config_path)?;
    prompt.say(&format!("Config saved to '{}'", config_path.display()))?;

    let answer = prompt.ask("Split now? (y/n)")?;
    if !answer.eq_ignore_ascii_case("y") {
        return Ok(EXIT_SUCCESS);
    }

    let output_dir = PathBuf::from(prompt.ask_or("Output folder", DEFAULT_OUTPUT_DIR)?);
    split_with_config(prompt, &input_dir, &output_dir, &config_path, false, verbose)
}

/// Show the mode menu and run the chosen mode, returning the exit code.
pub fn menu<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    verbose: bool,
) -> Result<u8, SplitError> {
    prompt.say("SMART SPRITE SPLITTER")?;
    prompt.say("Split sheets holding a different number of sprites each")?;
    prompt.say(&"=".repeat(50))?;
    prompt.say("Choose a mode:")?;
    prompt.say("1. Auto-detect sprite counts and split (fast)")?;
    prompt.say("2. Enter sprite counts per file (accurate)")?;
    prompt.say("3. Split using a config file")?;
    prompt.say("4. Generate a config file only")?;

    let Some(choice) = MenuChoice::parse(&prompt.ask("\nChoice (1/2/3/4)")?) else {
        prompt.say("Invalid choice")?;
        return Ok(EXIT_INVALID_ARGS);
    };

    match choice {
        MenuChoice::AutoSplit => {
            let input_dir = PathBuf::from(prompt.ask_or("Input folder", DEFAULT_INPUT_DIR)?);
            let output_dir = PathBuf::from(prompt.ask_or("Output folder", DEFAULT_OUTPUT_DIR)?);
            prompt.say("Auto-detect mode")?;
            let config = Path::new(AUTO_CONFIG_FILE);
            split_with_config(prompt, &input_dir, &output_dir, config, true, verbose)
        }
        MenuChoice::Manual => manual_mode(prompt, None, DetectionMethod::default(), verbose),
        MenuChoice::FromConfig => {
            let input_dir = PathBuf::from(prompt.ask_or("Input folder", DEFAULT_INPUT_DIR)?);
            let output_dir = PathBuf::from(prompt.ask_or("Output folder", DEFAULT_OUTPUT_DIR)?);
            let config = PathBuf::from(prompt.ask_or("Config file", DEFAULT_CONFIG_FILE)?);
            split_with_config(prompt, &input_dir, &output_dir, &config, false, verbose)
        }
        MenuChoice::GenerateConfig => {
            let input_dir = PathBuf::from(prompt.ask_or("Input folder", DEFAULT_INPUT_DIR)?);
            let config = PathBuf::from(prompt.ask_or("Config file name", DEFAULT_CONFIG_FILE)?);
            generate_config(
                &input_dir,
                &config,
                DetectionMethod::default(),
                &ParallelSplit::new(),
                &console_reporter(verbose),
            )?;
            prompt.say(&format!(
                "Edit '{}' to adjust sprite counts, then run again with mode 3",
                config_write_path(&input_dir, &config).display()
            ))?;
            Ok(EXIT_SUCCESS)
        }
    }
}

fn terminal_prompt() -> Prompt<io::StdinLock<'static>, io::Stdout> {
    Prompt::new(io::stdin().lock(), io::stdout())
}

fn exit_code(result: Result<u8, SplitError>) -> ExitCode {
    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run the menu on the terminal
pub fn run_menu(verbose: bool) -> ExitCode {
    exit_code(menu(&mut terminal_prompt(), verbose))
}

/// Run the manual command on the terminal
pub fn run_manual_command(input: &Path, method: DetectionMethod, verbose: bool) -> ExitCode {
    exit_code(manual_mode(&mut terminal_prompt(), Some(input), method, verbose))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_sheet(path: &Path, width: u32, height: u32) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        RgbaImage::from_pixel(width, height, Rgba([90, 10, 10, 255])).save(path).unwrap();
    }

    fn prompt(answers: &str) -> Prompt<&[u8], Vec<u8>> {
        Prompt::new(answers.as_bytes(), Vec::new())
    }

    fn transcript(prompt: &Prompt<&[u8], Vec<u8>>) -> String {
        String::from_utf8_lossy(prompt.output()).into_owned()
    }

    #[test]
    fn test_ask_trims_and_defaults() {
        let mut p = prompt("  custom  \n\n");
        assert_eq!(p.ask_or("Input folder", "input").unwrap(), "custom");
        assert_eq!(p.ask_or("Output folder", "output").unwrap(), "output");
        assert!(transcript(&p).contains("Input folder: "));
    }

    #[test]
    fn test_ask_eof() {
        let mut p = prompt("");
        let err = p.ask("Anything").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::AutoSplit));
        assert_eq!(MenuChoice::parse(" 4 "), Some(MenuChoice::GenerateConfig));
        assert_eq!(MenuChoice::parse("5"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[test]
    fn test_collect_manual_config() {
        let temp = TempDir::new().unwrap();
        write_sheet(&temp.path().join("a.png"), 60, 20);
        write_sheet(&temp.path().join("b.png"), 60, 20);

        // a.png accepts the suggestion, b.png needs three tries
        let mut p = prompt("\n-1\nabc\n5\n");
        let config =
            collect_manual_config(&mut p, temp.path(), DetectionMethod::Transparency).unwrap();

        let a = config.get("a.png").unwrap();
        assert_eq!(a.count(), 3);
        assert!(a.auto_detected);

        let b = config.get("b.png").unwrap();
        assert_eq!(b.count(), 5);
        assert!(!b.auto_detected);
        assert!(b.file_size > 0);

        let text = transcript(&p);
        assert!(text.contains("a.png [suggested: 3]"));
        assert!(text.contains("Count must be 0 or more"));
        assert!(text.contains("Enter a whole number"));
    }

    #[test]
    fn test_collect_manual_config_accepts_zero() {
        let temp = TempDir::new().unwrap();
        write_sheet(&temp.path().join("a.png"), 60, 20);

        let mut p = prompt("0\n");
        let config =
            collect_manual_config(&mut p, temp.path(), DetectionMethod::Transparency).unwrap();
        assert_eq!(config.get("a.png").unwrap().count(), 0);
    }

    #[test]
    fn test_collect_manual_config_no_images() {
        let temp = TempDir::new().unwrap();
        let mut p = prompt("");
        let config =
            collect_manual_config(&mut p, temp.path(), DetectionMethod::Transparency).unwrap();
        assert!(config.is_empty());
        assert!(transcript(&p).contains("No image files"));
    }

    #[test]
    fn test_manual_mode_saves_config() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        write_sheet(&input.join("sheet.png"), 80, 20);

        let answers = format!("{}\n2\nn\n", input.display());
        let mut p = prompt(&answers);
        let code = manual_mode(&mut p, None, DetectionMethod::Transparency, false).unwrap();

        assert_eq!(code, EXIT_SUCCESS);
        let saved = load_config(&input.join(MANUAL_CONFIG_FILE)).unwrap();
        assert_eq!(saved.get("sheet.png").unwrap().count(), 2);
        assert!(!temp.path().join("output").exists());
    }

    #[test]
    fn test_manual_mode_split_now() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        write_sheet(&input.join("sheet.png"), 80, 20);

        let answers = format!("3\ny\n{}\n", output.display());
        let mut p = prompt(&answers);
        let code =
            manual_mode(&mut p, Some(&input), DetectionMethod::Transparency, false).unwrap();

        assert_eq!(code, EXIT_SUCCESS);
        assert!(output.join("sheet/sprite_03.png").is_file());
        assert!(!output.join("sheet/sprite_04.png").exists());
    }

    #[test]
    fn test_menu_invalid_choice() {
        let mut p = prompt("9\n");
        let code = menu(&mut p, false).unwrap();
        assert_eq!(code, EXIT_INVALID_ARGS);
        assert!(transcript(&p).contains("Invalid choice"));
    }

    #[test]
    fn test_menu_generate_config_only() {
        let temp = TempDir::new().unwrap();
        write_sheet(&temp.path().join("wide.png"), 40, 10);

        let answers = format!("4\n{}\nmine.json\n", temp.path().display());
        let mut p = prompt(&answers);
        let code = menu(&mut p, false).unwrap();

        assert_eq!(code, EXIT_SUCCESS);
        let saved = load_config(&temp.path().join("mine.json")).unwrap();
        assert_eq!(saved.get("wide.png").unwrap().count(), 4);
        assert!(transcript(&p).contains("mode 3"));
    }

    #[test]
    fn test_menu_auto_split() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        write_sheet(&input.join("wide.png"), 40, 20);

        let answers = format!("1\n{}\n{}\n", input.display(), output.display());
        let mut p = prompt(&answers);
        let code = menu(&mut p, false).unwrap();

        assert_eq!(code, EXIT_SUCCESS);
        assert!(input.join(AUTO_CONFIG_FILE).is_file());
        assert!(output.join("wide/sprite_02.png").is_file());
    }

    #[test]
    fn test_menu_auto_split_detects_again() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        let answers = format!("1\n{}\n{}\n", input.display(), output.display());

        write_sheet(&input.join("a.png"), 90, 30);
        assert_eq!(menu(&mut prompt(&answers), false).unwrap(), EXIT_SUCCESS);
        assert!(output.join("a/sprite_03.png").is_file());
        assert!(!output.join("a/sprite_04.png").exists());

        // The sheet grows; the saved auto config must not pin the old count
        write_sheet(&input.join("a.png"), 150, 30);
        assert_eq!(menu(&mut prompt(&answers), false).unwrap(), EXIT_SUCCESS);
        assert!(output.join("a/sprite_05.png").is_file());
        let saved = load_config(&input.join(AUTO_CONFIG_FILE)).unwrap();
        assert_eq!(saved.get("a.png").map(|e| e.count()), Some(5));
    }
}
