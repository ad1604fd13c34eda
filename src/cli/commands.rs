//! CLI command handlers.

use std::sync::Arc;

use crate::audio::{AudioDeliveryService, LoggingPlayer, PlaybackOutcome};
use crate::client::ApiClient;
use crate::config::AcimaConfig;
use crate::error::{ApiError, RecoverySuggestion};
use crate::flow::register_and_welcome;
use crate::types::{AnswerResult, Question, Report};

use super::{AnswerArgs, Cli, Commands, DemoArgs, PlayArgs, QuestionArgs, RegisterArgs};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Client and audio service built from the resolved configuration.
pub struct Session {
    pub client: ApiClient,
    pub audio: AudioDeliveryService,
}

impl Session {
    /// Config file and environment first, then command-line overrides.
    pub fn from_cli(cli: &Cli) -> Result<Self, ApiError> {
        let mut config = AcimaConfig::load(cli.config.as_deref())?;
        if let Some(base_url) = &cli.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(dir) = &cli.cache_dir {
            config.audio.cache_dir = dir.clone();
        }
        config.validate()?;

        let client = ApiClient::new(config.api)?;
        let audio = AudioDeliveryService::new(
            client.clone(),
            Arc::new(LoggingPlayer::new()),
            &config.audio,
        );
        Ok(Self { client, audio })
    }
}

/// Dispatch a parsed command.
pub async fn run(cli: Cli) -> CliResult {
    let session = Session::from_cli(&cli)?;
    match cli.command {
        Commands::Health => handle_health(&session).await,
        Commands::Register(args) => handle_register(&session, args).await,
        Commands::Question(args) => handle_question(&session, args).await,
        Commands::Answer(args) => handle_answer(&session, args).await,
        Commands::Responses(args) => handle_responses(&session, &args.email).await,
        Commands::Report(args) => handle_report(&session, &args.email).await,
        Commands::Play(args) => handle_play(&session, args).await,
        Commands::Demo(args) => handle_demo(&session, args).await,
    }
}

/// One-line hint printed under a failed command.
pub fn recovery_hint(err: &ApiError) -> &'static str {
    match err.recovery_suggestion() {
        RecoverySuggestion::RetryLater => "Is the backend running? Try again in a moment.",
        RecoverySuggestion::FixRequest => "The backend rejected the request; check the arguments.",
        RecoverySuggestion::CheckServerVersion => {
            "The backend answered in an unexpected format; check its version."
        }
        RecoverySuggestion::CheckConfiguration => {
            "Check --base-url, the config file and the ACIMA_* variables."
        }
        RecoverySuggestion::ContactSupport => "Unexpected failure.",
    }
}

async fn handle_health(session: &Session) -> CliResult {
    let health = session.client.health_check().await?;
    if health.is_healthy() {
        println!("✅ {} ({})", health.status, session.client.base_url());
    } else {
        println!("⚠️  {}", health.status);
    }
    if let Some(message) = health.message {
        println!("   {message}");
    }
    Ok(())
}

async fn handle_register(session: &Session, args: RegisterArgs) -> CliResult {
    let registration = register_and_welcome(
        &session.client,
        &session.audio,
        &args.nome,
        &args.grade,
        &args.email,
    )
    .await?;

    match &registration.response.child {
        Some(child) => println!("✅ Registered {} (id {}, ano {})", child.nome, child.id, child.ano),
        None if registration.accepted() => println!("✅ Registered {}", args.nome),
        None => println!("⚠️  Registration not accepted"),
    }

    if let Some(welcome) = registration.welcome {
        if args.wait {
            let outcome = welcome.await?;
            print_outcome(&outcome);
        }
    }
    Ok(())
}

async fn handle_question(session: &Session, args: QuestionArgs) -> CliResult {
    let question = session
        .client
        .request_new_question(args.ano, &args.email)
        .await?;
    print_question(&question);

    if args.narrate {
        match question.narration_path() {
            Some(path) => print_outcome(&session.audio.play_path(path).await),
            None => println!("🔇 No narration for this question"),
        }
    }
    Ok(())
}

async fn handle_answer(session: &Session, args: AnswerArgs) -> CliResult {
    let result = session
        .client
        .submit_answer(args.id, &args.resposta, &args.email)
        .await?;
    print_answer(&result);

    if args.play_feedback {
        play_feedback(session, &result).await;
    }
    Ok(())
}

async fn handle_responses(session: &Session, email: &str) -> CliResult {
    let page = session.client.get_responses(email).await?;
    println!("📚 {} answers stored for {}", page.total_responses, page.email);
    for record in &page.responses {
        let mark = if record.correct { "✅" } else { "❌" };
        let when = record
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "   {mark} #{} question {} → {} {when}",
            record.id, record.question_id, record.selected
        );
    }
    Ok(())
}

async fn handle_report(session: &Session, email: &str) -> CliResult {
    let report = session.client.get_report(email).await?;
    print_report(&report);
    Ok(())
}

async fn handle_play(session: &Session, args: PlayArgs) -> CliResult {
    let outcome = if args.name {
        session.audio.play_name(&args.reference).await
    } else {
        session.audio.play_path(&args.reference).await
    };
    print_outcome(&outcome);
    Ok(())
}

async fn handle_demo(session: &Session, args: DemoArgs) -> CliResult {
    println!("🚀 Acima demo session against {}", session.client.base_url());

    let health = session.client.health_check().await?;
    println!("🏥 {}", health.status);

    let registration = register_and_welcome(
        &session.client,
        &session.audio,
        &args.nome,
        &args.grade,
        &args.email,
    )
    .await?;
    if !registration.accepted() {
        return Err("registration not accepted".into());
    }
    let ano = registration
        .response
        .child
        .as_ref()
        .map(|child| child.ano)
        .unwrap_or(1);
    println!("📝 Registered {} (ano {ano})", args.nome);
    if let Some(welcome) = registration.welcome {
        print_outcome(&welcome.await?);
    }

    println!("\n🎯 Correct answer");
    let question = session.client.request_new_question(ano, &args.email).await?;
    print_question(&question);
    let right = session
        .client
        .submit_answer(question.id, &question.answer, &args.email)
        .await?;
    print_answer(&right);
    play_feedback(session, &right).await;

    println!("\n🎯 Wrong answer");
    let question = session.client.request_new_question(ano, &args.email).await?;
    print_question(&question);
    let wrong_choice = if question.answer.trim() != "B" { "B" } else { "C" };
    let wrong = session
        .client
        .submit_answer(question.id, wrong_choice, &args.email)
        .await?;
    print_answer(&wrong);
    play_feedback(session, &wrong).await;

    println!();
    handle_responses(session, &args.email).await?;
    println!();
    handle_report(session, &args.email).await?;

    println!("\n🎉 Demo finished");
    Ok(())
}

async fn play_feedback(session: &Session, result: &AnswerResult) {
    match result.audio_bytes() {
        Ok(Some(bytes)) => print_outcome(&session.audio.play_feedback(bytes).await),
        Ok(None) => println!("🔇 No feedback audio"),
        Err(err) => println!("🔇 {err}"),
    }
}

fn print_question(question: &Question) {
    println!("❓ [{}] {}", question.id, question.question);
    for (letter, text) in question.option_entries() {
        println!("   {letter}) {text}");
    }
}

fn print_answer(result: &AnswerResult) {
    let mark = if result.correta { "✅ Correct" } else { "❌ Incorrect" };
    println!("{mark}: {}", result.feedback);
    if !result.saved {
        println!("   ⚠️  answer was not saved");
    }
}

fn print_report(report: &Report) {
    match report {
        Report::Full(full) => {
            let summary = &full.performance_summary;
            println!("📊 Report for {} ({})", full.child_info.name, full.child_info.grade);
            println!(
                "   {} activities, {} correct, {:.1}% accuracy",
                summary.total_activities, summary.correct_answers, summary.accuracy_percentage
            );
            if !full.pedagogical_insights.is_empty() {
                println!("   {}", full.pedagogical_insights);
            }
            for recommendation in &full.recommendations {
                println!("   • {recommendation}");
            }
        }
        Report::Pending(pending) => {
            println!("📊 {} ({} answers): {}", pending.child_name, pending.total_responses, pending.message);
        }
    }
}

fn print_outcome(outcome: &PlaybackOutcome) {
    match outcome {
        PlaybackOutcome::Streamed { url } => println!("🔊 Streaming {url}"),
        PlaybackOutcome::PlayedFromMemory { url: Some(url) } => println!("🔊 Playing download of {url}"),
        PlaybackOutcome::PlayedFromMemory { url: None } => println!("🔊 Playing clip"),
        PlaybackOutcome::PlayedFromCache { path } => println!("🔊 Playing {}", path.display()),
        PlaybackOutcome::CacheHit { path } => println!("🔊 Playing cached {}", path.display()),
        PlaybackOutcome::Failed { failures } => {
            println!("🔇 Narration unavailable");
            for failure in failures {
                println!("   {}: {}", failure.strategy, failure.reason);
            }
        }
    }
}
