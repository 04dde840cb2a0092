//! Interactive selection of city, month and weekday, and the explore session
//! built on top of it.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::config::{CityCatalog, Settings};
use crate::filter::{DayFilter, MonthFilter, filter};
use crate::model::Table;
use crate::output::{render_page, render_report, title_case};
use crate::pager::Pager;
use crate::stats::Report;

/// A validated `(city, month, day)` choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Lowercase catalog key.
    pub city: String,
    pub month: MonthFilter,
    pub day: DayFilter,
}

/// Line-oriented question/answer over any reader and writer.
///
/// Every `ask_*` method returns `Ok(None)` once input is exhausted.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Asks until `parse` accepts the answer, printing `hint` after each rejection.
    pub fn ask_until<T>(
        &mut self,
        question: &str,
        hint: &str,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<Option<T>> {
        loop {
            let Some(answer) = self.ask(question)? else {
                return Ok(None);
            };
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => self.say(&format!("Please check your input ({e}). {hint}"))?,
            }
        }
    }

    pub fn ask_city(&mut self, catalog: &CityCatalog) -> Result<Option<String>> {
        let names: Vec<String> = catalog.cities().map(title_case).collect();
        let question = format!("Which city would you like to explore? ({})", names.join(", "));
        let hint = format!("Valid cities: {}.", names.join(", "));

        self.ask_until(&question, &hint, |answer| {
            let city = answer.trim().to_lowercase();
            if catalog.contains(&city) {
                Ok(city)
            } else {
                bail!("unknown city '{answer}'")
            }
        })
    }

    pub fn ask_month(&mut self) -> Result<Option<MonthFilter>> {
        self.ask_until(
            "Which month? Enter a month name or number, or \"all\" for no month filter:",
            "Valid values: January … December, 1-12 or \"all\".",
            |answer| answer.parse(),
        )
    }

    pub fn ask_day(&mut self) -> Result<Option<DayFilter>> {
        self.ask_until(
            "Which day of the week? Enter a weekday, or \"all\" for no day filter:",
            "Valid values: Monday … Sunday or \"all\".",
            |answer| answer.parse(),
        )
    }

    /// Asks for city, month and day in turn, acknowledging each choice.
    pub fn ask_selection(&mut self, catalog: &CityCatalog) -> Result<Option<Selection>> {
        let Some(city) = self.ask_city(catalog)? else {
            return Ok(None);
        };
        self.say(&format!("Thanks for choosing {}!\n", title_case(&city)))?;

        let Some(month) = self.ask_month()? else {
            return Ok(None);
        };
        self.say(&format!("Thanks for choosing {month}!\n"))?;

        let Some(day) = self.ask_day()? else {
            return Ok(None);
        };
        self.say(&format!("Thanks for choosing {day}!\n"))?;

        Ok(Some(Selection { city, month, day }))
    }

    /// True only for an answer of `y` (any case); EOF counts as no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        Ok(self
            .ask(question)?
            .is_some_and(|a| a.eq_ignore_ascii_case("y")))
    }
}

/// Runs the interactive loop: select, report, page through raw trips, restart.
///
/// `load` turns a resolved catalog source into a table. A failed load is
/// reported to the analyst, who may then start over.
pub fn explore<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    catalog: &CityCatalog,
    settings: &Settings,
    load: impl Fn(&str) -> Result<Table>,
) -> Result<()> {
    loop {
        prompter.say("Hello! Let's explore some US bikeshare data!\n")?;

        let Some(selection) = prompter.ask_selection(catalog)? else {
            return Ok(());
        };
        info!(
            city = %selection.city,
            month = %selection.month,
            day = %selection.day,
            "Selection made"
        );

        let Some(source) = catalog.resolve(&selection.city, &settings.data_dir) else {
            bail!("city '{}' vanished from the catalog", selection.city);
        };

        match load(&source) {
            Ok(table) => show_selection(prompter, &selection, &table, settings)?,
            Err(e) => {
                warn!(error = %e, source = %source, "Trip log failed to load");
                prompter.say(&format!("Could not load trips for {source}: {e:#}"))?;
            }
        }

        if !prompter.confirm("\nWould you like to restart? Enter y to start over, anything else to exit:")? {
            return Ok(());
        }
    }
}

fn show_selection<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    selection: &Selection,
    table: &Table,
    settings: &Settings,
) -> Result<()> {
    let reference_year = settings.reference_year_for(table.latest_year());
    let filtered = filter(table, selection.month, selection.day);
    let report = Report::compute(
        &selection.city,
        selection.month,
        selection.day,
        &filtered,
        reference_year,
    );
    prompter.say(&render_report(&report))?;

    let mut pager = Pager::new(&filtered);
    let mut question = "Would you like to see the selected trips? Enter y to see 5 of them:";
    while !pager.is_exhausted() && prompter.confirm(question)? {
        if let Some(page) = pager.next() {
            prompter.say(&render_page(&filtered.schema(), page)?)?;
        }
        question = "Enter y for 5 more trips:";
    }
    if pager.is_exhausted() && !filtered.is_empty() {
        prompter.say("That was every trip in this selection.")?;
    }
    Ok(())
}
