/*  Copyright (C) 2023 by the bat2ccdb authors
    This file is part of bat2ccdb.

    bat2ccdb is a tool to generate compilation database for clang tooling.

    bat2ccdb is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    bat2ccdb is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, stdin, stdout};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{arg, ArgAction, command};
use log::LevelFilter;
use path_absolutize::Absolutize;
use simple_logger::SimpleLogger;

use crate::compilation::{Compilation, Unit};
use crate::configuration::{Configuration, Layout};
use crate::extraction::VariableTable;

mod compilation;
mod configuration;
mod extraction;
mod output;

fn main() -> Result<()> {
    let arguments = Arguments::parse().validate()?;
    let application = Application::configure(arguments)?;
    application.run()?;

    Ok(())
}

#[derive(Debug, PartialEq)]
struct Arguments {
    input: String,
    output: String,
    directory: Option<String>,
    config: Option<String>,
    verbose: u8,
}

impl Arguments {
    fn parse() -> Self {
        let matches = command!()
            .args(&[
                arg!(-i --input <FILE> "Path of the build script")
                    .default_value("build.bat")
                    .hide_default_value(false),
                arg!(-o --output <FILE> "Path of the result file")
                    .default_value("compile_commands.json")
                    .hide_default_value(false),
                arg!(-d --directory <DIR> "Working directory recorded in the entries [default: current directory]"),
                arg!(-c --config <FILE> "Path of the config file"),
                arg!(-v --verbose ... "Sets the level of verbosity")
                    .action(ArgAction::Count),
            ])
            .get_matches();

        Arguments {
            input: matches.get_one::<String>("input")
                .expect("input is defaulted")
                .clone(),
            output: matches.get_one::<String>("output")
                .expect("output is defaulted")
                .clone(),
            directory: matches.get_one::<String>("directory")
                .map(String::to_string),
            config: matches.get_one::<String>("config")
                .map(String::to_string),
            verbose: matches.get_count("verbose"),
        }
    }

    fn validate(self) -> Result<Self> {
        if is_stdin(&self.input) && self.config.as_deref().is_some_and(is_stdin) {
            return Err(anyhow!("Both input and config reading the standard input."));
        }

        Ok(self)
    }

    fn prepare_logging(&self) -> Result<()> {
        let level = match &self.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        let mut logger = SimpleLogger::new()
            .with_level(level);
        if level <= LevelFilter::Debug {
            logger = logger.with_local_timestamps()
        }
        logger.init()?;

        Ok(())
    }

    fn configuration(&self) -> Result<Configuration> {
        let configuration = match self.config.as_deref() {
            Some(file) if is_stdin(file) =>
                configuration::io::from_stdin()
                    .context("Failed to read configuration from stdin")?,
            Some(file) =>
                configuration::io::from_file(Path::new(file))
                    .with_context(|| format!("Failed to read configuration from file: {}", file))?,
            None =>
                Configuration::default(),
        };
        Ok(configuration)
    }

    fn working_dir(&self) -> Result<PathBuf> {
        let current = std::env::current_dir()
            .context("Failed to get the current directory")?;
        match self.directory.as_deref() {
            Some(directory) => {
                let path = Path::new(directory).absolutize_from(current.as_path())
                    .with_context(|| format!("Failed to make directory absolute: {}", directory))?;
                Ok(path.to_path_buf())
            }
            None =>
                Ok(current),
        }
    }
}

#[derive(Debug, PartialEq)]
struct Application {
    arguments: Arguments,
    configuration: Configuration,
}

impl Application {
    fn configure(arguments: Arguments) -> Result<Self> {
        arguments.prepare_logging()?;

        let configuration = arguments.configuration()?;

        Ok(Application { arguments, configuration })
    }

    fn run(self) -> Result<()> {
        let platform = std::env::consts::OS;
        if !self.configuration.runs_on(platform) {
            log::info!("Platform {platform} is not configured to run on, nothing to do.");
            return Ok(());
        }

        let variables = self.read_variables()?;
        log::debug!("Found {} variables in the build script.", variables.len());

        // Resolve everything before the output is touched.
        let working_dir = self.arguments.working_dir()?;
        let compilation = Compilation::new(&variables, &self.configuration.compilation, working_dir)
            .context("Failed to assemble the compiler call")?;

        let units = compilation.units()
            .inspect(|unit| log::debug!("{:?}", unit));
        let layout = self.configuration.output.layout;
        match self.arguments.output.as_str() {
            "-" | "/dev/stdout" =>
                output::write(stdout().lock(), units, layout)
                    .context("Failed to write the standard output")?,
            path =>
                write_file(path, units, layout)?,
        };

        Ok(())
    }

    fn read_variables(&self) -> Result<VariableTable> {
        let input = self.arguments.input.as_str();
        let reader = open_input(input)?;
        let variables = extraction::from_reader(reader)
            .with_context(|| format!("Failed to read build script: {}", input))?;
        Ok(variables)
    }
}

fn write_file<'a>(path: &str, units: impl Iterator<Item=Unit<'a>>, layout: Layout) -> Result<()> {
    let temp = format!("{}.tmp", path);
    let result = write_temp_file(&temp, units, layout)
        .and_then(|_| {
            std::fs::rename(&temp, path)
                .with_context(|| format!("Failed to rename file from '{}' to '{}'.", temp, path))
        });
    if result.is_err() {
        match std::fs::remove_file(&temp) {
            Err(cleanup) if cleanup.kind() != ErrorKind::NotFound =>
                log::warn!("Failed to remove file '{}': {}", temp, cleanup),
            _ => (),
        }
    }
    result
}

fn write_temp_file<'a>(temp: &str, units: impl Iterator<Item=Unit<'a>>, layout: Layout) -> Result<()> {
    let file = File::create(temp)
        .with_context(|| format!("Failed to create file: {}", temp))?;
    let buffer = BufWriter::new(file);
    output::write(buffer, units, layout)
        .with_context(|| format!("Failed to write file: {}", temp))
}

fn open_input(input: &str) -> Result<BufReader<Box<dyn Read>>> {
    let reader: BufReader<Box<dyn Read>> = if is_stdin(input) {
        BufReader::new(Box::new(stdin()))
    } else {
        let file = OpenOptions::new().read(true).open(input)
            .with_context(|| format!("Failed to open file: {}", input))?;
        BufReader::new(Box::new(file))
    };
    Ok(reader)
}

fn is_stdin(path: &str) -> bool {
    path == "-" || path == "/dev/stdin"
}
