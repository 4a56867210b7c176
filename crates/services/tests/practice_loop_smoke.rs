use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use practice_core::model::{
    Cluster, Level, OptionKey, Question, QuestionBank, QuestionId, SessionSettings,
};
use practice_core::time::fixed_now;
use services::sessions::SaveStatus;
use services::{
    AppServices, Applied, Clock, GenerationError, QuestionGenerator, StateKind, Step, TopicQuery,
};

/// Hands out pre-built banks in order, then fails.
struct ScriptedGenerator {
    banks: Mutex<Vec<QuestionBank>>,
}

impl ScriptedGenerator {
    fn new(mut banks: Vec<QuestionBank>) -> Self {
        banks.reverse();
        Self {
            banks: Mutex::new(banks),
        }
    }
}

#[async_trait]
impl QuestionGenerator for ScriptedGenerator {
    async fn generate(&self, _: &SessionSettings) -> Result<QuestionBank, GenerationError> {
        self.banks
            .lock()
            .unwrap()
            .pop()
            .ok_or(GenerationError::EmptyBank)
    }
}

fn key(k: &str) -> OptionKey {
    OptionKey::new(k).unwrap()
}

fn marketing_bank() -> QuestionBank {
    let rows = [
        ("What is the goal of penetration pricing?", "B", "Pricing"),
        ("Which is a push promotion strategy?", "A", "Promotion"),
        ("Which channel member takes title to goods?", "C", "Channel Management"),
        ("What does price elasticity measure?", "D", "Pricing"),
    ];
    let questions = rows
        .iter()
        .enumerate()
        .map(|(i, (stem, correct, topic))| {
            let options: BTreeMap<_, _> = ["A", "B", "C", "D"]
                .into_iter()
                .map(|k| (key(k), format!("Choice {k}")))
                .collect();
            Question::new(QuestionId::positional(i), *stem, options, key(correct))
                .unwrap()
                .with_topic(Some((*topic).to_owned()))
        })
        .collect();
    QuestionBank::new(questions).unwrap()
}

#[tokio::test]
async fn practice_loop_scores_persists_and_reports_weak_topics() {
    let generator = Arc::new(ScriptedGenerator::new(vec![marketing_bank()]));
    let services = AppServices::in_memory(generator, Clock::fixed(fixed_now()));
    let driver = services.session_loop();
    let mut controller = services.new_controller();

    let settings = services.settings(Cluster::Marketing, Level::District, 4);
    let applied = driver.start(&mut controller, settings).await.unwrap();
    assert!(matches!(applied, Applied::Activated { questions: 4 }));

    // Wrong on both pricing questions, right on the rest, last one unanswered.
    let answers = ["A", "A", "C"];
    for answer in answers {
        controller.answer_current(key(answer)).unwrap();
        assert!(matches!(controller.next().unwrap(), Step::Moved(_)));
    }
    assert_eq!(controller.next().unwrap(), Step::AtBoundary);

    let progress = controller.progress().unwrap();
    assert_eq!(progress.answered, 3);
    assert!(progress.all_visited);

    let outcome = driver.finalize(&mut controller).await.unwrap();
    assert_eq!(outcome.report.correct_count, 2);
    assert_eq!(outcome.report.total_count, 4);
    assert_eq!(outcome.report.percentage, 50);
    assert_eq!(outcome.report.unanswered_count(), 1);
    let id = outcome.saved.unwrap();

    controller.show_review().unwrap();
    let done = controller.completed().unwrap();
    assert_eq!(done.save_status(), &SaveStatus::Saved(id));
    assert_eq!(done.missed_items().len(), 2);

    let history = services.history();
    let stored = history.get_attempt(id).await.unwrap();
    assert_eq!(stored.report(), &outcome.report);

    let weakest = history
        .weakest(&TopicQuery::for_cluster(Cluster::Marketing), 1)
        .await
        .unwrap();
    assert_eq!(weakest.len(), 1);
    assert_eq!(weakest[0].topic, "Pricing");
    assert_eq!((weakest[0].wrong_count, weakest[0].total_count), (2, 2));

    controller.restart();
    assert_eq!(controller.kind(), StateKind::Configuring);
}

#[tokio::test]
async fn restart_during_loading_drops_the_late_bank() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        marketing_bank(),
        marketing_bank(),
    ]));
    let services = AppServices::in_memory(generator, Clock::fixed(fixed_now()));
    let driver = services.session_loop();
    let mut controller = services.new_controller();

    let stale = controller
        .submit(services.settings(Cluster::Marketing, Level::Icdc, 4))
        .unwrap();
    controller.restart();

    let late = driver.fulfil(stale).await;
    assert!(matches!(controller.apply_generation(late), Applied::Stale));
    assert_eq!(controller.kind(), StateKind::Configuring);

    let applied = driver
        .start(
            &mut controller,
            services.settings(Cluster::Marketing, Level::Icdc, 4),
        )
        .await
        .unwrap();
    assert!(matches!(applied, Applied::Activated { questions: 4 }));
}
