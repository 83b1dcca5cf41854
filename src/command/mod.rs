//! Shell command parsing for the `shell` check.
//!
//! Commands are parsed with brush-parser into a real AST and flattened into
//! one [`CommandSegment`] per executed program, so `a && b | c` yields three
//! segments and quoted operators never split a command.

mod rule;

pub use rule::ShellRule;

use brush_parser::ast;

/// One program invocation extracted from a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSegment {
    /// Basename of the executed program (`/bin/rm` → `rm`).
    pub program: String,
    /// Arguments with combined short flags expanded.
    pub args: Vec<String>,
}

impl CommandSegment {
    /// Split args into (flags, positionals). Everything after `--` is positional.
    pub fn classify_args(&self) -> (Vec<&str>, Vec<&str>) {
        let mut flags = Vec::new();
        let mut positionals = Vec::new();
        let mut end_of_options = false;
        for arg in &self.args {
            if arg == "--" {
                end_of_options = true;
            } else if !end_of_options && arg.starts_with('-') && arg != "-" {
                flags.push(arg.as_str());
            } else {
                positionals.push(arg.as_str());
            }
        }
        (flags, positionals)
    }
}

/// Error returned when a command string cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Parse a shell command string into program segments.
pub fn parse(command: &str) -> Result<Vec<CommandSegment>, ParseError> {
    if command.trim().is_empty() {
        return Ok(vec![]);
    }

    let mut parser = brush_parser::Parser::builder()
        .reader(std::io::Cursor::new(command.to_string()))
        .build();

    let program = parser
        .parse_program()
        .map_err(|e| ParseError(e.to_string()))?;

    let mut segments = Vec::new();
    for complete_command in &program.complete_commands {
        for item in &complete_command.0 {
            visit_and_or_list(&item.0, &mut segments);
        }
    }
    Ok(segments)
}

/// Expand combined short flags: `-rf` → `["-r", "-f"]`.
///
/// Long flags, single short flags, positionals, `-`, `--` and `x=y` forms
/// are returned unchanged.
pub fn expand_flags(arg: &str) -> Vec<String> {
    if !arg.starts_with('-')
        || arg == "-"
        || arg == "--"
        || arg.starts_with("--")
        || arg.contains('=')
    {
        return vec![arg.to_string()];
    }
    let chars: Vec<char> = arg[1..].chars().collect();
    if chars.len() == 1 {
        return vec![arg.to_string()];
    }
    chars.iter().map(|c| format!("-{c}")).collect()
}

fn basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn visit_and_or_list(list: &ast::AndOrList, segments: &mut Vec<CommandSegment>) {
    visit_pipeline(&list.first, segments);
    for and_or in &list.additional {
        match and_or {
            ast::AndOr::And(pipeline) | ast::AndOr::Or(pipeline) => {
                visit_pipeline(pipeline, segments);
            }
        }
    }
}

fn visit_pipeline(pipeline: &ast::Pipeline, segments: &mut Vec<CommandSegment>) {
    for command in &pipeline.seq {
        visit_command(command, segments);
    }
}

/// Builtins that run another program named in their arguments.
const TRANSPARENT_WRAPPERS: &[&str] = &["command", "env", "nohup", "exec", "builtin", "sudo"];

fn visit_command(command: &ast::Command, segments: &mut Vec<CommandSegment>) {
    match command {
        ast::Command::Simple(simple) => {
            let Some(word) = &simple.word_or_name else {
                return;
            };
            let name = word.flatten();
            if name.is_empty() {
                return;
            }
            let words = suffix_words(&simple.suffix);
            segments.push(unwrap_wrappers(&name, words));
        }
        ast::Command::Compound(compound, _) => visit_compound(compound, segments),
        ast::Command::Function(func) => visit_compound(&func.body.0, segments),
        ast::Command::ExtendedTest(_) => {}
    }
}

/// Plain words of a command suffix; redirections and assignments are dropped.
fn suffix_words(suffix: &Option<ast::CommandSuffix>) -> Vec<String> {
    let Some(suffix) = suffix else {
        return vec![];
    };
    suffix
        .0
        .iter()
        .filter_map(|item| match item {
            ast::CommandPrefixOrSuffixItem::Word(word) => Some(word.flatten()),
            _ => None,
        })
        .collect()
}

/// Options of a wrapper that consume the following word.
fn consuming_options_for(wrapper: &str) -> &'static [&'static str] {
    match wrapper {
        "env" => &["-u", "--unset", "-C", "--chdir", "-P"],
        "exec" => &["-a"],
        "sudo" => &["-u", "--user", "-g", "--group", "-C", "-h", "--host"],
        _ => &[],
    }
}

/// Peel `env FOO=1 command nohup rm -rf x` down to `rm -rf x`.
///
/// A wrapper with nothing left to run is reported as itself.
fn unwrap_wrappers(name: &str, words: Vec<String>) -> CommandSegment {
    let mut program = basename(name).to_string();
    let mut rest = words.into_iter().peekable();

    while TRANSPARENT_WRAPPERS.contains(&program.as_str()) {
        let consuming = consuming_options_for(&program);
        let mut target = None;
        while let Some(word) = rest.next() {
            if word.starts_with('-') {
                if consuming.contains(&word.as_str()) {
                    rest.next();
                }
                continue;
            }
            if word.contains('=') {
                continue;
            }
            target = Some(word);
            break;
        }
        match target {
            Some(next) => program = basename(&next).to_string(),
            None => {
                return CommandSegment {
                    program,
                    args: vec![],
                }
            }
        }
    }

    let mut args = Vec::new();
    let mut end_of_options = false;
    for word in rest {
        if word == "--" {
            end_of_options = true;
            args.push(word);
        } else if end_of_options {
            args.push(word);
        } else {
            args.extend(expand_flags(&word));
        }
    }
    CommandSegment { program, args }
}

fn visit_compound(command: &ast::CompoundCommand, segments: &mut Vec<CommandSegment>) {
    match command {
        ast::CompoundCommand::BraceGroup(cmd) => visit_compound_list(&cmd.list, segments),
        ast::CompoundCommand::Subshell(cmd) => visit_compound_list(&cmd.list, segments),
        ast::CompoundCommand::ForClause(cmd) => visit_compound_list(&cmd.body.list, segments),
        ast::CompoundCommand::ArithmeticForClause(cmd) => {
            visit_compound_list(&cmd.body.list, segments);
        }
        ast::CompoundCommand::WhileClause(cmd) | ast::CompoundCommand::UntilClause(cmd) => {
            visit_compound_list(&cmd.0, segments);
            visit_compound_list(&cmd.1.list, segments);
        }
        ast::CompoundCommand::IfClause(cmd) => {
            visit_compound_list(&cmd.condition, segments);
            visit_compound_list(&cmd.then, segments);
            if let Some(elses) = &cmd.elses {
                for clause in elses {
                    if let Some(condition) = &clause.condition {
                        visit_compound_list(condition, segments);
                    }
                    visit_compound_list(&clause.body, segments);
                }
            }
        }
        ast::CompoundCommand::CaseClause(cmd) => {
            for case_item in &cmd.cases {
                if let Some(body) = &case_item.cmd {
                    visit_compound_list(body, segments);
                }
            }
        }
        ast::CompoundCommand::Arithmetic(_) => {}
    }
}

fn visit_compound_list(list: &ast::CompoundList, segments: &mut Vec<CommandSegment>) {
    for item in &list.0 {
        visit_and_or_list(&item.0, segments);
    }
}
