//! Operator console: a line-oriented command set over the running world.
//!
//! Every command only reads world state. Output goes to any [`Write`] so
//! the renderers can be tested against a buffer; colour is optional.

use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use llamarpg_core::social::AffinityBand;
use llamarpg_core::World;
use tracing::warn;

/// Rows and columns in the `map` view.
pub const MAP_CELLS: usize = 20;

/// World units per map cell.
pub const CELL_SIZE: f64 = 5.0;

/// Default window for `history`.
pub const DEFAULT_HISTORY: usize = 10;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Status of every NPC.
    Status,
    /// Last `n` event-log lines.
    History(usize),
    /// Live view of one NPC until a key is pressed.
    Follow(String),
    /// NPCs near one NPC.
    Near(String),
    /// Inventory of one NPC.
    Inv(String),
    /// Relationships of one NPC.
    Rel(String),
    /// Simplified world map.
    Map,
    /// Clear the screen.
    Clear,
    /// Command list.
    Help,
    /// Stop the simulation.
    Quit,
}

/// Why a line did not parse as a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command needs an NPC id. Holds what the id is for.
    MissingId(&'static str),
    /// Not a known command.
    Unknown(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId(purpose) => write!(f, "Please specify an NPC ID {purpose}."),
            Self::Unknown(_) => f.write_str("Unknown command. Type \"help\" for available commands."),
        }
    }
}

impl std::error::Error for CommandError {}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let mut words = lowered.split_whitespace();
        let command = words.next().unwrap_or_default();
        let arg = words.next().map(str::to_string);
        let id = |purpose| arg.clone().ok_or(CommandError::MissingId(purpose));

        match command {
            "status" => Ok(Self::Status),
            "history" => Ok(Self::History(
                arg.as_deref()
                    .and_then(|a| a.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_HISTORY),
            )),
            "follow" => Ok(Self::Follow(id("to follow")?)),
            "near" => Ok(Self::Near(id("to check nearby NPCs")?)),
            "inv" => Ok(Self::Inv(id("to view inventory")?)),
            "rel" => Ok(Self::Rel(id("to view relationships")?)),
            "map" => Ok(Self::Map),
            "clear" => Ok(Self::Clear),
            "help" => Ok(Self::Help),
            "quit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Whether the console should keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop the console and the simulation.
    Quit,
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

const HELP: [(&str, &str); 10] = [
    ("status      ", "Show current status of all NPCs"),
    ("history [n] ", "Show last n events (default: 10)"),
    ("follow <id> ", "Follow specific NPC's activities"),
    ("near <id>   ", "Show NPCs near specified NPC"),
    ("inv <id>    ", "Show detailed inventory of an NPC"),
    ("rel <id>    ", "Show relationships of an NPC"),
    ("map         ", "Show simplified world map"),
    ("clear       ", "Clear the console"),
    ("help        ", "Show this help message"),
    ("quit        ", "Exit simulation"),
];

/// Renders world state for an operator.
#[derive(Debug, Clone)]
pub struct Console {
    world: Arc<World>,
    color: bool,
    interactive: bool,
}

impl Console {
    /// Console over `world`; `color` toggles ANSI styling.
    #[must_use]
    pub fn new(world: Arc<World>, color: bool) -> Self {
        Self {
            world,
            color,
            interactive: io::stdin().is_terminal(),
        }
    }

    /// Override terminal detection; `follow` only runs on a terminal.
    #[must_use]
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    /// Read commands from `input` until `quit` or end of input.
    ///
    /// # Errors
    /// Propagates I/O errors from `input` or `out`.
    pub fn run(&self, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        self.banner(out)?;
        self.prompt(out)?;
        for line in input.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                let flow = match line.parse::<Command>() {
                    Ok(command) => self.execute(&command, out)?,
                    Err(err) => {
                        writeln!(out, "\n{}\n", self.paint(&err.to_string(), Color::Red))?;
                        Flow::Continue
                    }
                };
                if flow == Flow::Quit {
                    return Ok(());
                }
            }
            self.prompt(out)?;
        }
        writeln!(out, "{}", self.paint("\nEnding simulation...\n", Color::Yellow))
    }

    fn banner(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint("\n=== Welcome to LlamaRPG NPC Simulation ===", Color::Cyan))?;
        writeln!(out, "{}", self.paint("Type \"help\" to see available commands.\n", Color::Yellow))
    }

    fn prompt(&self, out: &mut impl Write) -> io::Result<()> {
        write!(out, "{}", self.paint("observer> ", Color::Cyan))?;
        out.flush()
    }

    /// Run one command.
    ///
    /// # Errors
    /// Propagates I/O errors from `out` or the terminal.
    pub fn execute(&self, command: &Command, out: &mut impl Write) -> io::Result<Flow> {
        match command {
            Command::Status => self.status(out)?,
            Command::History(n) => self.history(*n, out)?,
            Command::Follow(id) => self.follow(id, out)?,
            Command::Near(id) => self.near(id, out)?,
            Command::Inv(id) => self.inventory(id, out)?,
            Command::Rel(id) => self.relationships(id, out)?,
            Command::Map => self.map(out)?,
            Command::Clear => execute!(out, Clear(ClearType::All), MoveTo(0, 0))?,
            Command::Help => self.help(out)?,
            Command::Quit => {
                writeln!(out, "{}", self.paint("\nEnding simulation...\n", Color::Yellow))?;
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn not_found(&self, id: &str, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint(&format!("\nNPC with ID {id} not found.\n"), Color::Red))
    }

    /// `help`
    ///
    /// # Errors
    /// Propagates write errors.
    pub fn help(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint("\nAvailable Commands:", Color::Yellow))?;
        for (usage, text) in HELP {
            writeln!(out, "  {}- {text}", self.paint(usage, Color::Green))?;
        }
        writeln!(out)
    }

    /// `status`
    ///
    /// # Errors
    /// Propagates write errors.
    pub fn status(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint("\nWorld Status:", Color::Yellow))?;
        for npc in self.world.status() {
            writeln!(out, "{}", self.paint(&format!("\n{} ({})", npc.name, npc.role), Color::Cyan))?;
            writeln!(out, "  Location: {}", npc.location)?;
            writeln!(out, "  Task: {}", npc.current_task.as_deref().unwrap_or("Idle"))?;
            if npc.inventory.is_empty() {
                writeln!(out, "  Inventory: Empty")?;
            } else {
                writeln!(out, "  Inventory:")?;
                for (item, quantity) in npc.inventory.iter() {
                    writeln!(out, "    - {item}: {quantity}")?;
                }
            }
            let s = npc.specialization;
            writeln!(
                out,
                "  Specializations: mining {:.2}, woodcutting {:.2}, crafting {:.2}, trading {:.2}",
                s.mining, s.woodcutting, s.crafting, s.trading
            )?;
            if npc.relationships.is_empty() {
                writeln!(out, "  Relationships: None")?;
            } else {
                writeln!(out, "  Relationships: {}", npc.relationships.join(", "))?;
            }
        }
        writeln!(out)
    }

    /// `history [n]`
    ///
    /// # Errors
    /// Propagates write errors.
    pub fn history(&self, n: usize, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint("\nRecent Events:", Color::Yellow))?;
        for line in self.world.recent_events(n) {
            writeln!(out, "{line}")?;
        }
        writeln!(out)
    }

    /// `near <id>`
    ///
    /// # Errors
    /// Propagates write errors.
    pub fn near(&self, id: &str, out: &mut impl Write) -> io::Result<()> {
        let Some(npc) = self.world.npc(id) else {
            return self.not_found(id, out);
        };
        let radius = self.world.config().world.perception_radius;
        writeln!(out, "{}", self.paint(&format!("\nNPCs near {}:", npc.name), Color::Yellow))?;
        for other in self.world.nearby(&npc.location(), radius) {
            if other.id == npc.id {
                continue;
            }
            writeln!(out, "{}", self.paint(&format!("\n{} ({})", other.name, other.role), Color::Cyan))?;
            writeln!(out, "  Distance: {} units", other.distance.floor())?;
            writeln!(out, "  Location: {}", other.location)?;
        }
        writeln!(out)
    }

    /// `inv <id>`
    ///
    /// # Errors
    /// Propagates write errors.
    pub fn inventory(&self, id: &str, out: &mut impl Write) -> io::Result<()> {
        let Some(npc) = self.world.npc(id) else {
            return self.not_found(id, out);
        };
        writeln!(out, "{}", self.paint(&format!("\n{}'s Inventory:", npc.name), Color::Yellow))?;
        if npc.inventory.is_empty() {
            writeln!(out, "Empty inventory")?;
        } else {
            for (item, quantity) in npc.inventory.iter() {
                writeln!(out, "{}{quantity}", self.paint(&format!("{item}: "), Color::Cyan))?;
            }
        }
        writeln!(out)
    }

    /// `rel <id>`
    ///
    /// # Errors
    /// Propagates write errors.
    pub fn relationships(&self, id: &str, out: &mut impl Write) -> io::Result<()> {
        let Some(npc) = self.world.npc(id) else {
            return self.not_found(id, out);
        };
        writeln!(out, "{}", self.paint(&format!("\n{}'s Relationships:", npc.name), Color::Yellow))?;
        for (other, score) in npc.relationships.iter() {
            let Some(name) = self.world.name_of(other.as_str()) else {
                continue;
            };
            let color = match AffinityBand::of(score) {
                AffinityBand::Close => Color::Green,
                AffinityBand::Friendly => Color::Yellow,
                AffinityBand::Cool => Color::Red,
                AffinityBand::Distant => Color::DarkGrey,
            };
            writeln!(out, "{name}: {}", self.paint(&format!("{score}%"), color))?;
        }
        writeln!(out)
    }

    /// `map`
    ///
    /// # Errors
    /// Propagates write errors.
    pub fn map(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint("\nWorld Map (simplified):", Color::Yellow))?;
        let mut grid = vec![vec![".".to_string(); MAP_CELLS]; MAP_CELLS];
        for npc in self.world.status() {
            let (col, row) = map_cell(npc.location.x, npc.location.y);
            let initial = npc.name.chars().next().map(String::from).unwrap_or_default();
            grid[row][col] = self.paint(&initial, Color::Cyan);
        }

        let header: String = (0..MAP_CELLS)
            .map(|i| if i % 5 == 0 { format!("{:>4}", i / 5) } else { "    ".to_string() })
            .collect();
        writeln!(out, "  {header}")?;
        for (i, row) in grid.iter().enumerate() {
            let label = if i % 5 == 0 { format!("{} ", i / 5) } else { "  ".to_string() };
            writeln!(out, "{label}{}", row.join(" "))?;
        }
        writeln!(out, "\nLegend: Each character represents the first letter of an NPC's name\n")
    }

    /// The lines of one `follow` refresh, or `None` if `id` is unknown.
    #[must_use]
    pub fn follow_frame(&self, id: &str) -> Option<Vec<String>> {
        let npc = self.world.npc(id)?;
        let (x, y) = npc.location().cell();
        let mut lines = vec![
            self.paint(&format!("Following {}:", npc.name), Color::Cyan),
            format!("Location: {x}, {y}"),
            format!("Current Task: {}", npc.current_task.as_deref().unwrap_or("Idle")),
            format!("Inventory: {}", npc.inventory.to_json()),
            String::new(),
            "Recent memories:".to_string(),
        ];
        lines.extend(npc.recent_memories(3).into_iter().map(|m| format!("- {m}")));
        lines.push(String::new());
        lines.push("Press any key to stop following...".to_string());
        Some(lines)
    }

    /// `follow <id>`: redraw every second until a key is pressed.
    ///
    /// Without an interactive terminal it prints a notice and returns.
    ///
    /// # Errors
    /// Propagates write errors and failures while leaving raw mode.
    pub fn follow(&self, id: &str, out: &mut impl Write) -> io::Result<()> {
        let Some(name) = self.world.name_of(id) else {
            return self.not_found(id, out);
        };
        if !self.interactive {
            return self.no_terminal(out);
        }
        if let Err(err) = terminal::enable_raw_mode() {
            warn!(error = %err, "cannot enter raw mode");
            return self.no_terminal(out);
        }
        let banner = format!("\nFollowing {name}. Press any key to stop following.\n");
        writeln!(out, "{}", self.paint(&banner, Color::Yellow))?;

        let result = self.follow_loop(id, out);
        terminal::disable_raw_mode()?;
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        result
    }

    fn no_terminal(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.paint("\nfollow needs an interactive terminal.\n", Color::Red))
    }

    fn follow_loop(&self, id: &str, out: &mut impl Write) -> io::Result<()> {
        while let Some(lines) = self.follow_frame(id) {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
            // Raw mode: lines need an explicit carriage return.
            for line in lines {
                write!(out, "{line}\r\n")?;
            }
            out.flush()?;
            if event::poll(Duration::from_secs(1))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Map cell `(column, row)` for a world position.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn map_cell(x: f64, y: f64) -> (usize, usize) {
    let cell = |v: f64| ((v / CELL_SIZE).floor().max(0.0) as usize) % MAP_CELLS;
    (cell(x), cell(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamarpg_core::config::SimConfig;
    use llamarpg_core::npc::{Npc, Specialization};
    use llamarpg_core::roster::NpcDefinition;
    use llamarpg_core::{EntityId, Location};
    use tokio::time::Instant;

    fn npc(id: &str, name: &str, x: f64, y: f64) -> Npc {
        let def = NpcDefinition::new(id, name, "Tester", "plain");
        Npc::new(&def, Location::new(x, y), Specialization::uniform(0.5), 10, Instant::now())
    }

    fn console() -> Console {
        let mut alice = npc("alice", "Alice", 12.0, 7.0);
        alice.inventory.add("oak_wood", 3);
        alice.adjust_relationship(&EntityId::new("bob"), 30, 50);
        alice.adjust_relationship(&EntityId::new("carl"), -30, 50);
        alice.current_task = Some("woodcut oak_wood".into());
        let npcs = vec![alice, npc("bob", "Bob", 15.0, 7.0), npc("carl", "Carl", 90.0, 90.0)];
        let world = World::from_npcs(SimConfig::default(), npcs, 0).expect("world");
        Console::new(Arc::new(world), false)
    }

    fn render(f: impl FnOnce(&Console, &mut Vec<u8>) -> io::Result<()>) -> String {
        let console = console();
        let mut out = Vec::new();
        f(&console, &mut out).expect("renders");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!("STATUS".parse::<Command>(), Ok(Command::Status));
        assert_eq!("history".parse::<Command>(), Ok(Command::History(10)));
        assert_eq!("history 25".parse::<Command>(), Ok(Command::History(25)));
        assert_eq!("history lots".parse::<Command>(), Ok(Command::History(10)));
        assert_eq!("  Follow Woodie ".parse::<Command>(), Ok(Command::Follow("woodie".into())));
        assert_eq!("rel miner_mike".parse::<Command>(), Ok(Command::Rel("miner_mike".into())));
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn missing_id_and_unknown_command_messages() {
        let err = "inv".parse::<Command>().expect_err("needs id");
        assert_eq!(err.to_string(), "Please specify an NPC ID to view inventory.");
        let err = "near".parse::<Command>().expect_err("needs id");
        assert_eq!(err.to_string(), "Please specify an NPC ID to check nearby NPCs.");
        let err = "dance".parse::<Command>().expect_err("unknown");
        assert_eq!(err.to_string(), "Unknown command. Type \"help\" for available commands.");
    }

    #[test]
    fn status_lists_everyone() {
        let text = render(|c, out| c.status(out));
        assert!(text.contains("Alice (Tester)"));
        assert!(text.contains("  Location: (12, 7)"));
        assert!(text.contains("  Task: woodcut oak_wood"));
        assert!(text.contains("    - oak_wood: 3"));
        assert!(text.contains("  Relationships: Bob: 80%, Carl: 20%"));
        assert!(text.contains("  Task: Idle"));
        assert!(text.contains("  Inventory: Empty"));
    }

    #[test]
    fn near_excludes_self_and_far_npcs() {
        let text = render(|c, out| c.near("alice", out));
        assert!(text.contains("NPCs near Alice:"));
        assert!(text.contains("Bob (Tester)"));
        assert!(text.contains("  Distance: 3 units"));
        assert!(!text.contains("Carl"));
        assert!(!text.contains("Alice (Tester)"));
    }

    #[test]
    fn unknown_id_is_reported() {
        let text = render(|c, out| c.inventory("nobody", out));
        assert!(text.contains("NPC with ID nobody not found."));
    }

    #[test]
    fn inventory_and_relationships() {
        let text = render(|c, out| c.inventory("alice", out));
        assert!(text.contains("Alice's Inventory:"));
        assert!(text.contains("oak_wood: 3"));
        let text = render(|c, out| c.inventory("bob", out));
        assert!(text.contains("Empty inventory"));
        let text = render(|c, out| c.relationships("alice", out));
        assert!(text.contains("Bob: 80%"));
        assert!(text.contains("Carl: 20%"));
    }

    #[test]
    fn map_places_initials() {
        let text = render(|c, out| c.map(out));
        let lines: Vec<&str> = text.lines().collect();
        let header = lines.iter().position(|l| l.starts_with("World Map")).expect("title") + 1;
        assert_eq!(
            lines[header].trim_end(),
            "     0                   1                   2                   3"
        );
        // Row 1 (y in 5..10) holds Alice at column 2 and Bob at column 3.
        let row1 = lines[header + 2];
        let cells: Vec<&str> = row1[2..].split(' ').collect();
        assert_eq!(cells[2], "A");
        assert_eq!(cells[3], "B");
        // Row 18 holds Carl at column 18.
        let row18: Vec<&str> = lines[header + 19][2..].split(' ').collect();
        assert_eq!(row18[18], "C");
        assert!(text.contains("Legend: Each character represents the first letter of an NPC's name"));
    }

    #[test]
    fn map_cells_wrap_into_grid() {
        assert_eq!(map_cell(0.0, 0.0), (0, 0));
        assert_eq!(map_cell(99.0, 4.99), (19, 0));
        assert_eq!(map_cell(12.0, 7.0), (2, 1));
    }

    #[test]
    fn follow_frame_shows_recent_state() {
        let c = console();
        let lines = c.follow_frame("alice").expect("known");
        assert_eq!(lines[0], "Following Alice:");
        assert_eq!(lines[1], "Location: 12, 7");
        assert_eq!(lines[2], "Current Task: woodcut oak_wood");
        assert_eq!(lines[3], "Inventory: {\"oak_wood\":3}");
        assert!(lines.last().expect("footer").starts_with("Press any key"));
        assert!(c.follow_frame("ghost").is_none());
    }

    #[test]
    fn repl_runs_until_quit() {
        let c = console();
        let input = io::Cursor::new("help\n\nbogus\nhistory 3\nquit\nstatus\n");
        let mut out = Vec::new();
        c.run(input, &mut out).expect("runs");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("=== Welcome to LlamaRPG NPC Simulation ==="));
        assert!(text.contains("Available Commands:"));
        assert!(text.contains("Unknown command."));
        assert!(text.contains("Recent Events:"));
        assert!(text.contains("Ending simulation..."));
        assert!(!text.contains("World Status:"));
    }

    #[test]
    fn follow_without_terminal_keeps_the_console_running() {
        let c = console().with_interactive(false);
        let mut out = Vec::new();
        c.run(io::Cursor::new("follow alice\nstatus\nquit\n"), &mut out).expect("runs");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("follow needs an interactive terminal."));
        assert!(!text.contains("Press any key"));
        assert!(text.contains("World Status:"));
        assert!(text.contains("Ending simulation..."));
    }

    #[test]
    fn repl_stops_at_end_of_input() {
        let c = console();
        let mut out = Vec::new();
        c.run(io::Cursor::new("map\n"), &mut out).expect("runs");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("World Map"));
        assert!(text.trim_end().ends_with("Ending simulation..."));
    }
}
