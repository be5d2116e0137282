use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use lesson_core::LessonPlan;
use lesson_core::model::{
    AnswerOutcome, Flashcard, FlashcardId, Progress, ProgressUpdate, QuizItem, QuizItemCommand,
    QuizItemId, QuizPhase, QuizTransition, Topic, TopicId,
};
use lesson_core::time::fixed_now;
use services::{Clock, LessonError, LessonPlanService, SilentSoundPlayer, SoundPlayer};
use storage::repository::{InMemoryStore, KeyValueStore, StorageError};
use storage::{ProgressGateway, ProgressRecord, progress_key};

const GREETINGS: TopicId = TopicId::new(0);
const HELLO: QuizItemId = QuizItemId::new(1);
const OUI: QuizItemId = QuizItemId::new(2);

#[derive(Default)]
struct RecordingSoundPlayer {
    played: Mutex<Vec<String>>,
}

impl RecordingSoundPlayer {
    fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

impl SoundPlayer for RecordingSoundPlayer {
    fn play_sound(&self, name: &str) {
        self.played.lock().unwrap().push(name.to_owned());
    }
}

struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn set(&self, _key: &str, _value: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

fn service_with(store: Arc<dyn KeyValueStore>, sound: Arc<dyn SoundPlayer>) -> LessonPlanService {
    LessonPlanService::new(
        Clock::fixed(fixed_now()),
        LessonPlan::french().unwrap(),
        ProgressGateway::new(store),
        sound,
    )
}

fn service() -> (LessonPlanService, InMemoryStore) {
    let store = InMemoryStore::new();
    let svc = service_with(Arc::new(store.clone()), Arc::new(SilentSoundPlayer));
    (svc, store)
}

fn advance(svc: &mut LessonPlanService, secs: i64) {
    let mut clock = svc.clock();
    clock.advance(Duration::seconds(secs));
    svc.set_clock(clock);
}

async fn stored_progress(store: &InMemoryStore, topic_id: TopicId) -> Option<Progress> {
    let bytes = store.get(&progress_key(topic_id)).await.unwrap()?;
    Some(ProgressRecord::decode(&bytes).unwrap().into_progress())
}

#[tokio::test]
async fn fresh_topic_has_default_progress() {
    let (mut svc, store) = service();
    let progress = svc.get_progress(GREETINGS).await;
    assert_eq!(progress, Progress::new(GREETINGS));

    let unknown = svc.get_progress(TopicId::new(77)).await;
    assert_eq!(unknown.quiz_high_score, None);
    assert_eq!(store.len().unwrap(), 0);
}

#[tokio::test]
async fn persisted_progress_is_loaded_lazily() {
    let store = InMemoryStore::new();
    let mut saved = Progress::new(GREETINGS);
    saved.flashcard_studied = true;
    ProgressGateway::new(Arc::new(store.clone())).save(&saved).await;

    let mut svc = service_with(Arc::new(store), Arc::new(SilentSoundPlayer));
    assert_eq!(svc.get_progress(GREETINGS).await, saved);
    assert_eq!(svc.all_progress().await, vec![saved]);
}

#[tokio::test]
async fn progress_updates_write_through() {
    let (mut svc, store) = service();
    svc.update_progress(GREETINGS, ProgressUpdate::SetLessonRead(true))
        .await;

    let stored = stored_progress(&store, GREETINGS).await.unwrap();
    assert!(stored.lesson_read);
    assert!(!stored.flashcard_studied);

    // A fresh service over the same store sees the confirmed write.
    let mut reopened = service_with(Arc::new(store.clone()), Arc::new(SilentSoundPlayer));
    assert!(reopened.get_progress(GREETINGS).await.lesson_read);
}

#[tokio::test]
async fn storage_failures_never_reach_the_caller() {
    let mut svc = service_with(Arc::new(FailingStore), Arc::new(SilentSoundPlayer));
    assert_eq!(svc.get_progress(GREETINGS).await, Progress::new(GREETINGS));

    let updated = svc
        .update_progress(GREETINGS, ProgressUpdate::SetFlashcardStudied(true))
        .await;
    assert!(updated.flashcard_studied);
    assert!(svc.get_progress(GREETINGS).await.flashcard_studied);
}

#[test]
fn correct_answer_scores_with_bonus_and_plays_once() {
    let sound = Arc::new(RecordingSoundPlayer::default());
    let mut svc = service_with(Arc::new(InMemoryStore::new()), sound.clone());

    svc.open_question(HELLO, GREETINGS).unwrap();
    advance(&mut svc, 3);
    let outcome = svc.submit_answer(HELLO, GREETINGS, "Bonjour").unwrap();
    assert_eq!(outcome, AnswerOutcome::Correct { score: 19 });
    assert_eq!(svc.quiz_score(GREETINGS), Some(19));

    let err = svc.submit_answer(HELLO, GREETINGS, "bonjour").unwrap_err();
    assert_eq!(err, LessonError::AlreadyAnswered(HELLO));
    assert_eq!(svc.quiz_score(GREETINGS), Some(19));
    assert_eq!(sound.played(), vec!["Ding".to_owned()]);
}

#[test]
fn submit_command_scores_and_plays_cue_once() {
    let sound = Arc::new(RecordingSoundPlayer::default());
    let mut svc = service_with(Arc::new(InMemoryStore::new()), sound.clone());

    svc.apply_quiz_command(HELLO, GREETINGS, QuizItemCommand::SetQuestionOpen(true))
        .unwrap();
    advance(&mut svc, 3);
    let transition = svc
        .apply_quiz_command(
            HELLO,
            GREETINGS,
            QuizItemCommand::SubmitAnswer("Bonjour".into()),
        )
        .unwrap();
    assert_eq!(
        transition,
        QuizTransition::Answered(AnswerOutcome::Correct { score: 19 })
    );

    let err = svc
        .apply_quiz_command(
            HELLO,
            GREETINGS,
            QuizItemCommand::SubmitAnswer("bonjour".into()),
        )
        .unwrap_err();
    assert_eq!(err, LessonError::AlreadyAnswered(HELLO));
    assert_eq!(svc.quiz_score(GREETINGS), Some(19));
    assert_eq!(sound.played(), vec!["Ding".to_owned()]);
}

#[test]
fn slow_correct_answer_loses_base_points() {
    let (mut svc, _store) = service();
    svc.open_question(HELLO, GREETINGS).unwrap();
    advance(&mut svc, 25);
    let outcome = svc.submit_answer(HELLO, GREETINGS, "bonjour").unwrap();
    assert_eq!(outcome, AnswerOutcome::Correct { score: 8 });
}

#[test]
fn incorrect_answer_plays_nothing_and_scores_zero() {
    let sound = Arc::new(RecordingSoundPlayer::default());
    let mut svc = service_with(Arc::new(InMemoryStore::new()), sound.clone());

    svc.open_question(OUI, GREETINGS).unwrap();
    let outcome = svc.submit_answer(OUI, GREETINGS, "no").unwrap();
    assert_eq!(outcome, AnswerOutcome::Incorrect);
    assert!(svc.submit_answer(OUI, GREETINGS, "yes").is_err());

    let item = svc.quiz_item(OUI, GREETINGS).unwrap();
    assert_eq!(item.is_correct(), Some(false));
    assert_eq!(item.score(), 0);
    assert!(sound.played().is_empty());
}

#[test]
fn closing_and_reopening_does_not_double_count_time() {
    let (mut svc, _) = service();
    svc.open_question(HELLO, GREETINGS).unwrap();
    advance(&mut svc, 4);
    svc.close_question(HELLO, GREETINGS).unwrap();
    advance(&mut svc, 30);
    svc.open_question(HELLO, GREETINGS).unwrap();

    let timing = svc.quiz_item_timing(HELLO, GREETINGS).unwrap();
    assert_eq!(timing.bonus_time_remaining, 16.0);
    assert!(!timing.is_consuming_bonus_time);

    let outcome = svc.submit_answer(HELLO, GREETINGS, "BONJOUR").unwrap();
    assert_eq!(outcome, AnswerOutcome::Correct { score: 18 });
}

#[test]
fn reset_quiz_restores_pristine_timer_behavior() {
    let (mut svc, _) = service();
    svc.open_question(HELLO, GREETINGS).unwrap();
    advance(&mut svc, 6);
    svc.submit_answer(HELLO, GREETINGS, "bonjour").unwrap();

    svc.reset_quiz(GREETINGS).unwrap();
    let item = svc.quiz_item(HELLO, GREETINGS).unwrap();
    assert_eq!(item.phase(), QuizPhase::Unopened);
    assert_eq!(svc.quiz_score(GREETINGS), Some(0));

    advance(&mut svc, 100);
    let reopened_at = svc.clock().now();
    let transition = svc
        .apply_quiz_command(HELLO, GREETINGS, QuizItemCommand::SetQuestionOpen(true))
        .unwrap();
    assert_eq!(transition, QuizTransition::Opened { timer_started: true });
    let item = svc.quiz_item(HELLO, GREETINGS).unwrap();
    assert_eq!(item.question_opened(), Some(reopened_at));
    assert_eq!(item.bonus_time_remaining(reopened_at), 20.0);
}

#[test]
fn reset_flashcards_turns_all_face_up() {
    let (mut svc, _) = service();
    assert!(!svc.flip_flashcard(FlashcardId::new(1), GREETINGS).unwrap());
    assert!(!svc.flip_flashcard(FlashcardId::new(3), GREETINGS).unwrap());

    svc.reset_flashcards(GREETINGS).unwrap();
    let topic = svc.get_topic(GREETINGS).unwrap();
    assert!(topic.flashcards().iter().all(Flashcard::is_face_up));
}

#[test]
fn unknown_ids_are_benign_not_found() {
    let (mut svc, _) = service();
    let missing = TopicId::new(9);
    assert!(svc.get_topic(missing).is_none());
    assert!(svc.reset_flashcards(missing).unwrap_err().is_not_found());
    assert!(svc.reset_quiz(missing).unwrap_err().is_not_found());
    assert!(
        svc.open_question(QuizItemId::new(99), GREETINGS)
            .unwrap_err()
            .is_not_found()
    );
    assert!(svc.quiz_item_timing(QuizItemId::new(99), GREETINGS).is_none());
}

#[tokio::test]
async fn passing_quiz_records_high_score() {
    let (mut svc, store) = service();
    svc.open_question(HELLO, GREETINGS).unwrap();
    advance(&mut svc, 3);
    svc.submit_answer(HELLO, GREETINGS, "Bonjour").unwrap();
    svc.open_question(OUI, GREETINGS).unwrap();
    advance(&mut svc, 20);
    svc.submit_answer(OUI, GREETINGS, "Yes").unwrap();

    let result = svc.finish_quiz(GREETINGS).await.unwrap();
    assert!(result.passed);
    assert_eq!(result.score, 29);
    assert_eq!(result.high_score, Some(29));

    let stored = stored_progress(&store, GREETINGS).await.unwrap();
    assert!(stored.quiz_passed);
    assert_eq!(stored.quiz_high_score, Some(29));
}

#[tokio::test]
async fn failed_quiz_leaves_progress_untouched() {
    let (mut svc, store) = service();
    svc.update_progress(GREETINGS, ProgressUpdate::SetQuizHighScore(25))
        .await;

    svc.open_question(HELLO, GREETINGS).unwrap();
    advance(&mut svc, 3);
    svc.submit_answer(HELLO, GREETINGS, "Bonjour").unwrap();
    svc.submit_answer(OUI, GREETINGS, "non").unwrap();
    assert_eq!(svc.quiz_score(GREETINGS), Some(19));

    let result = svc.finish_quiz(GREETINGS).await.unwrap();
    assert!(!result.passed);
    assert_eq!(result.high_score, Some(25));

    let stored = stored_progress(&store, GREETINGS).await.unwrap();
    assert!(!stored.quiz_passed);
    assert_eq!(stored.quiz_high_score, Some(25));
}

#[tokio::test]
async fn unanswered_item_fails_the_quiz() {
    let (mut svc, store) = service();
    svc.submit_answer(HELLO, GREETINGS, "bonjour").unwrap();

    let result = svc.finish_quiz(GREETINGS).await.unwrap();
    assert!(!result.passed);
    assert_eq!(stored_progress(&store, GREETINGS).await, None);
}

#[tokio::test]
async fn lower_retake_keeps_high_score() {
    let quiz = vec![QuizItem::new(QuizItemId::new(1), "Merci?", vec![], "thanks").unwrap()];
    let topic = Topic::new(TopicId::new(3), "Politeness", "", vec![], quiz).unwrap();
    let plan = LessonPlan::new("French", vec![topic]).unwrap();
    let store = InMemoryStore::new();
    let mut svc = LessonPlanService::new(
        Clock::fixed(fixed_now()),
        plan,
        ProgressGateway::new(Arc::new(store.clone())),
        Arc::new(SilentSoundPlayer),
    );
    let topic_id = TopicId::new(3);
    let item_id = QuizItemId::new(1);

    svc.open_question(item_id, topic_id).unwrap();
    svc.submit_answer(item_id, topic_id, "thanks").unwrap();
    assert_eq!(svc.finish_quiz(topic_id).await.unwrap().high_score, Some(20));

    svc.reset_quiz(topic_id).unwrap();
    svc.open_question(item_id, topic_id).unwrap();
    advance(&mut svc, 10);
    svc.submit_answer(item_id, topic_id, "Thanks").unwrap();
    let result = svc.finish_quiz(topic_id).await.unwrap();
    assert!(result.passed);
    assert_eq!(result.score, 15);
    assert_eq!(result.high_score, Some(20));
}
