//! `lazytask` terminal shell.
//!
//! # Responsibility
//! - Load config, start logging and open the task database.
//! - Map subcommands onto `TaskService` calls and print plain-text views.
//! - Own the reminder polling loop.

mod cli;
mod notify;
mod render;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use cli::{AddArgs, Cli, Command, EditArgs, ListArgs, MonthArgs, WatchArgs};
use lazytask_core::config::default_config_path;
use lazytask_core::db::open_db;
use lazytask_core::{
    init_logging, shift_month, AppConfig, EmailChannel, LogChannel, NewTask, ReminderScheduler,
    SqliteTaskStore, Task, TaskId, TaskListQuery, TaskService, TaskStore, TaskUpdate,
};
use log::{error, info};
use notify::{OutboxGateway, TerminalChannel};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = AppConfig::load(&config_path)?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(err) = init_logging(level, config.log_dir()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let db_path = cli.database.clone().unwrap_or_else(|| config.db_path());
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open task database `{}`", db_path.display()))?;
    let service = TaskService::new(SqliteTaskStore::new(&conn));

    match cli.command {
        Command::Add(args) => add(&service, args),
        Command::Edit(args) => edit(&service, args),
        Command::List(args) => list(&service, args),
        Command::Done(arg) => {
            let id = resolve_id(&service, &arg.id)?;
            print_task(&service.toggle_complete(id)?);
            Ok(())
        }
        Command::Pause(arg) => {
            let id = resolve_id(&service, &arg.id)?;
            print_task(&service.pause_task(id)?);
            Ok(())
        }
        Command::Resume(arg) => {
            let id = resolve_id(&service, &arg.id)?;
            print_task(&service.resume_task(id)?);
            Ok(())
        }
        Command::Rm(arg) => {
            let id = resolve_id(&service, &arg.id)?;
            service.delete_task(id)?;
            println!("deleted {}", &id.to_string()[..render::SHORT_ID_LEN]);
            Ok(())
        }
        Command::Month(args) => month(&service, &config, args),
        Command::Categories => {
            for category in service.categories()? {
                println!("{category}");
            }
            Ok(())
        }
        Command::Watch(args) => watch(&service, &config, args),
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn print_task(task: &Task) {
    println!("{}", render::task_line(task));
}

fn add<S: TaskStore>(service: &TaskService<S>, args: AddArgs) -> Result<()> {
    let mut request = NewTask::new(args.title, args.due);
    request.priority = args.priority.into();
    request.category = args.category;
    request.notes = args.notes;
    if let Some(recurrence) = args.repeat.to_recurrence(args.due) {
        request.recurrence = recurrence;
    }
    print_task(&service.create_task(request)?);
    Ok(())
}

/// Empty string clears an optional text field.
fn optional_text(value: Option<String>) -> Option<Option<String>> {
    value.map(|text| (!text.trim().is_empty()).then_some(text))
}

fn edit<S: TaskStore>(service: &TaskService<S>, args: EditArgs) -> Result<()> {
    let id = resolve_id(service, &args.id)?;
    let anchor = match args.due {
        Some(due) => due,
        None => service
            .get_task(id)?
            .map(|task| task.due_date)
            .context("task disappeared while editing")?,
    };
    let update = TaskUpdate {
        title: args.title,
        due_date: args.due,
        notes: optional_text(args.notes),
        priority: args.priority.map(Into::into),
        category: optional_text(args.category),
        recurrence: args.repeat.to_recurrence(anchor),
    };
    print_task(&service.update_task(id, update)?);
    Ok(())
}

fn list<S: TaskStore>(service: &TaskService<S>, args: ListArgs) -> Result<()> {
    let query = TaskListQuery {
        status: args.status.map(Into::into),
        category: args.category,
        priority: args.priority.map(Into::into),
        limit: args.limit,
    };
    print!("{}", render::task_list(&service.list_tasks(&query)?));
    Ok(())
}

fn month<S: TaskStore>(service: &TaskService<S>, config: &AppConfig, args: MonthArgs) -> Result<()> {
    let today = now().date();
    let view_date = shift_month(args.date.unwrap_or(today), args.offset);
    let max = args.max_per_day.unwrap_or(config.max_entries_per_day);
    let view = service.month_view(view_date, Some(today), max)?;
    print!("{}", render::month_grid(&view));
    Ok(())
}

fn scheduler_for(config: &AppConfig) -> Result<ReminderScheduler> {
    let mut scheduler = ReminderScheduler::new();
    scheduler.register(Box::new(LogChannel))?;
    scheduler.register(Box::new(TerminalChannel))?;
    if let Some(email) = &config.email {
        let gateway = OutboxGateway::new(config.data_dir.join("outbox"));
        scheduler.register(Box::new(EmailChannel::new(gateway, email.clone())))?;
    }
    Ok(scheduler)
}

fn watch<S: TaskStore>(service: &TaskService<S>, config: &AppConfig, args: WatchArgs) -> Result<()> {
    let scheduler = scheduler_for(config)?;
    info!(
        "event=watch_start module=cli status=ok channels={} poll_secs={}",
        scheduler.channel_ids().join(","),
        config.poll_interval_secs
    );
    loop {
        check_reminders(&scheduler, service, now(), args.once)?;
        if args.once {
            return Ok(());
        }
        std::thread::sleep(config.poll_interval());
    }
}

/// Runs one reminder tick.
///
/// With `strict` unset a store error is logged and swallowed, so the
/// polling loop survives a busy database and retries on the next tick.
fn check_reminders<S: TaskStore>(
    scheduler: &ReminderScheduler,
    service: &TaskService<S>,
    at: NaiveDateTime,
    strict: bool,
) -> Result<()> {
    match scheduler.tick(service, at) {
        Ok(report) => {
            for failure in &report.failures {
                eprintln!(
                    "warning: {} channel failed for {}: {}",
                    failure.channel_id, failure.task_id, failure.message
                );
            }
            Ok(())
        }
        Err(err) if strict => Err(err.into()),
        Err(err) => {
            error!("event=reminder_tick module=cli status=error error={err}");
            eprintln!("warning: reminder check failed: {err}");
            Ok(())
        }
    }
}

fn resolve_id<S: TaskStore>(service: &TaskService<S>, query: &str) -> Result<TaskId> {
    match_id(&service.snapshot()?, query)
}

/// Finds the single task whose id starts with `query`.
///
/// Hyphens and case are ignored, so both the short list form and a full
/// UUID match.
fn match_id(tasks: &[Task], query: &str) -> Result<TaskId> {
    let needle: String = query
        .trim()
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if needle.is_empty() {
        bail!("task id must not be empty");
    }
    let mut matches = tasks
        .iter()
        .filter(|task| task.id.simple().to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id),
        (None, _) => bail!("no task matches id `{query}`"),
        (Some(_), Some(_)) => bail!("id `{query}` is ambiguous; use more characters"),
    }
}
