use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiError, Book, BookProgress, Chapter, ContentApi};
use crate::command::{Command, CommandType};
use crate::config::CoreConfig;
use crate::event::{
    CommandStatus, Direction, PaginationEventKind, ReaderEvent, ReadingEventKind,
};
use crate::runtime::ReaderRuntime;
use crate::session::{ReadingSession, SessionState};

/// Scripted stand-in for the content server.
struct MockApi {
    books: Vec<Book>,
    chapters: Vec<Chapter>,
    fail_bookshelf: Option<String>,
    fail_chapter_list: Option<String>,
    fail_content: Option<String>,
    saved: Mutex<Vec<BookProgress>>,
}

impl MockApi {
    fn with_chapters(count: usize) -> Self {
        MockApi {
            books: vec![mock_book()],
            chapters: make_chapters(count),
            fail_bookshelf: None,
            fail_chapter_list: None,
            fail_content: None,
            saved: Mutex::new(Vec::new()),
        }
    }

    fn failing_content(count: usize, message: &str) -> Self {
        MockApi {
            fail_content: Some(message.to_string()),
            ..Self::with_chapters(count)
        }
    }
}

#[async_trait]
impl ContentApi for MockApi {
    async fn fetch_bookshelf(&self) -> Result<Vec<Book>, ApiError> {
        match &self.fail_bookshelf {
            Some(message) => Err(ApiError::Remote(message.clone())),
            None => Ok(self.books.clone()),
        }
    }

    async fn fetch_chapter_list(&self, _book_url: &str) -> Result<Vec<Chapter>, ApiError> {
        match &self.fail_chapter_list {
            Some(message) => Err(ApiError::Remote(message.clone())),
            None => Ok(self.chapters.clone()),
        }
    }

    async fn fetch_chapter_content(
        &self,
        _book_url: &str,
        index: usize,
    ) -> Result<String, ApiError> {
        match &self.fail_content {
            Some(message) => Err(ApiError::Remote(message.clone())),
            None => Ok(format!("chapter {index} text")),
        }
    }

    async fn save_progress(&self, progress: BookProgress) -> Result<(), ApiError> {
        self.saved.lock().unwrap().push(progress);
        Ok(())
    }
}

fn mock_book() -> Book {
    Book {
        name: "Mock Book".into(),
        author: "Nobody".into(),
        book_url: "mock://book/1".into(),
        ..Book::default()
    }
}

fn make_chapters(count: usize) -> Vec<Chapter> {
    (0..count)
        .map(|i| Chapter {
            index: i,
            title: format!("Chapter {}", i + 1),
            ..Chapter::default()
        })
        .collect()
}

type Collected = Arc<Mutex<Vec<ReaderEvent>>>;

fn runtime_with(api: MockApi, config: CoreConfig) -> (ReaderRuntime, Collected) {
    let runtime = ReaderRuntime::new(Arc::new(api), config);
    let collected: Collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    runtime.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    (runtime, collected)
}

/// Put the runtime into a live reading session without going through the
/// network path.
fn seed_session(runtime: &ReaderRuntime, chapter_count: usize, index: usize) {
    let session = ReadingSession::new(mock_book(), make_chapters(chapter_count), index)
        .with_content(format!("chapter {index} text"));
    runtime.store().set_session(session);
    assert!(runtime.state().transition(SessionState::Loading));
    assert!(runtime.state().transition(SessionState::Reading));
}

fn command_statuses(collected: &Collected) -> Vec<(CommandStatus, Option<String>)> {
    collected
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            ReaderEvent::Command(cmd) => Some((cmd.status, cmd.message.clone())),
            _ => None,
        })
        .collect()
}

fn reading_kinds(collected: &Collected) -> Vec<ReadingEventKind> {
    collected
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            ReaderEvent::Reading(reading) => Some(reading.kind),
            _ => None,
        })
        .collect()
}

fn last_failure_message(collected: &Collected) -> Option<String> {
    command_statuses(collected)
        .into_iter()
        .rev()
        .find(|(status, _)| *status == CommandStatus::Failed)
        .and_then(|(_, message)| message)
}

#[tokio::test]
async fn next_chapter_loads_and_advances() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(5), CoreConfig::default());
    seed_session(&runtime, 5, 0);

    runtime.dispatch(Command::of(CommandType::NextChapter)).await;

    let session = runtime.store().session().expect("session survives");
    assert_eq!(session.current_chapter_index, 1);
    assert_eq!(session.current_content.as_deref(), Some("chapter 1 text"));
    assert!(runtime.state().is_reading());

    let loaded = collected
        .lock()
        .unwrap()
        .iter()
        .find_map(|event| match event {
            ReaderEvent::Reading(reading) if reading.kind == ReadingEventKind::ChapterLoaded => {
                Some(reading.clone())
            }
            _ => None,
        })
        .expect("chapter loaded event published");
    assert_eq!(loaded.direction, Some(Direction::Next));
    assert_eq!(loaded.content.as_deref(), Some("chapter 1 text"));

    assert_eq!(
        command_statuses(&collected)
            .iter()
            .map(|(status, _)| *status)
            .collect::<Vec<_>>(),
        vec![CommandStatus::Started, CommandStatus::Success]
    );
}

#[tokio::test]
async fn next_chapter_failure_rolls_back() {
    let (runtime, collected) = runtime_with(
        MockApi::failing_content(5, "timeout"),
        CoreConfig::default(),
    );
    seed_session(&runtime, 5, 2);

    runtime.dispatch(Command::of(CommandType::NextChapter)).await;

    let session = runtime.store().session().expect("session survives");
    assert_eq!(session.current_chapter_index, 2);
    assert!(runtime.state().is_reading());

    let kinds = reading_kinds(&collected);
    assert_eq!(
        kinds,
        vec![
            ReadingEventKind::ChapterLoading,
            ReadingEventKind::ChapterLoadFailed
        ]
    );
    let message = last_failure_message(&collected).expect("failure message");
    assert!(message.contains("timeout"), "unexpected message: {message}");
}

#[tokio::test]
async fn next_chapter_at_last_chapter_fails_without_loading() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(3), CoreConfig::default());
    seed_session(&runtime, 3, 2);

    runtime.dispatch(Command::of(CommandType::NextChapter)).await;

    assert_eq!(runtime.store().current_chapter_index(), Some(2));
    assert!(reading_kinds(&collected).is_empty());
    let message = last_failure_message(&collected).expect("failure message");
    assert!(message.contains("last chapter"), "unexpected message: {message}");
}

#[tokio::test]
async fn previous_chapter_at_first_fails() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(3), CoreConfig::default());
    seed_session(&runtime, 3, 0);

    runtime
        .dispatch(Command::of(CommandType::PreviousChapter))
        .await;

    assert_eq!(runtime.store().current_chapter_index(), Some(0));
    let message = last_failure_message(&collected).expect("failure message");
    assert!(message.contains("first chapter"), "unexpected message: {message}");
}

#[tokio::test]
async fn busy_guard_rejects_while_loading() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(5), CoreConfig::default());
    seed_session(&runtime, 5, 1);
    // Simulate an in-flight load.
    assert!(runtime.state().transition(SessionState::Loading));

    runtime.dispatch(Command::of(CommandType::NextChapter)).await;

    assert_eq!(runtime.store().current_chapter_index(), Some(1));
    assert!(runtime.state().is_loading());
    let message = last_failure_message(&collected).expect("failure message");
    assert!(message.contains("in progress"), "unexpected message: {message}");
}

#[tokio::test]
async fn jump_to_chapter_out_of_range_fails() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(3), CoreConfig::default());
    seed_session(&runtime, 3, 1);

    runtime.dispatch(Command::jump_to_chapter(9)).await;

    assert_eq!(runtime.store().current_chapter_index(), Some(1));
    let message = last_failure_message(&collected).expect("failure message");
    assert!(message.contains("out of range"), "unexpected message: {message}");
}

#[tokio::test]
async fn jump_to_chapter_loads_the_target() {
    let (runtime, _collected) = runtime_with(MockApi::with_chapters(10), CoreConfig::default());
    seed_session(&runtime, 10, 1);

    runtime.dispatch(Command::jump_to_chapter(7)).await;

    let session = runtime.store().session().expect("session survives");
    assert_eq!(session.current_chapter_index, 7);
    assert_eq!(session.current_content.as_deref(), Some("chapter 7 text"));
}

#[tokio::test]
async fn select_book_establishes_session() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(4), CoreConfig::default());

    runtime.dispatch(Command::select_book(mock_book(), 2)).await;

    let session = runtime.store().session().expect("session created");
    assert_eq!(session.book.name, "Mock Book");
    assert_eq!(session.chapters.len(), 4);
    assert_eq!(session.current_chapter_index, 2);
    assert_eq!(session.current_content.as_deref(), Some("chapter 2 text"));
    assert!(runtime.state().is_reading());
    assert!(reading_kinds(&collected).contains(&ReadingEventKind::ChapterLoaded));
}

#[tokio::test]
async fn select_book_failure_enters_error_state_and_allows_retry() {
    let (runtime, collected) = runtime_with(
        MockApi {
            fail_chapter_list: Some("unreachable".into()),
            ..MockApi::with_chapters(4)
        },
        CoreConfig::default(),
    );

    runtime.dispatch(Command::select_book(mock_book(), 0)).await;

    assert!(runtime.store().session().is_none());
    assert!(runtime.state().is_error());
    assert!(reading_kinds(&collected).contains(&ReadingEventKind::ChapterLoadFailed));
    // Error -> Loading stays open for a retry.
    assert!(runtime.state().transition(SessionState::Loading));
}

#[tokio::test]
async fn back_to_bookshelf_clears_everything() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(3), CoreConfig::default());
    seed_session(&runtime, 3, 1);

    runtime
        .dispatch(Command::of(CommandType::BackToBookshelf))
        .await;

    assert!(runtime.store().session().is_none());
    assert!(runtime.state().is_idle());
    assert!(reading_kinds(&collected).contains(&ReadingEventKind::SessionEnded));
}

#[tokio::test]
async fn toggle_reading_mode_flips_the_flag() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(1), CoreConfig::default());

    runtime
        .dispatch(Command::of(CommandType::ToggleReadingMode))
        .await;
    runtime
        .dispatch(Command::of(CommandType::ToggleReadingMode))
        .await;

    let statuses: Vec<_> = command_statuses(&collected)
        .iter()
        .map(|(status, _)| *status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            CommandStatus::Started,
            CommandStatus::Success,
            CommandStatus::Started,
            CommandStatus::Success
        ]
    );
    assert!(!runtime.command_bus().context().reading_mode());
}

#[tokio::test]
async fn refresh_bookshelf_publishes_loaded_books() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(1), CoreConfig::default());

    runtime.dispatch(Command::refresh_bookshelf(None)).await;

    let events = collected.lock().unwrap();
    let loaded = events
        .iter()
        .find_map(|event| match event {
            ReaderEvent::Bookshelf(shelf) => shelf.books.clone(),
            _ => None,
        })
        .expect("loaded bookshelf event");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "Mock Book");
}

#[tokio::test]
async fn refresh_bookshelf_failure_publishes_load_failed() {
    let (runtime, collected) = runtime_with(
        MockApi {
            fail_bookshelf: Some("server down".into()),
            ..MockApi::with_chapters(1)
        },
        CoreConfig::default(),
    );

    runtime.dispatch(Command::refresh_bookshelf(None)).await;

    let message = last_failure_message(&collected).expect("failure message");
    assert!(message.contains("server down"), "unexpected message: {message}");
}

#[tokio::test]
async fn page_turns_emit_page_changed() {
    // "chapter 2 text" is 14 units; page size 5 gives three pages.
    let config = CoreConfig {
        page_size: 5,
        ..CoreConfig::default()
    };
    let (runtime, collected) = runtime_with(MockApi::with_chapters(4), config);
    runtime.dispatch(Command::select_book(mock_book(), 2)).await;

    runtime.dispatch(Command::of(CommandType::NextPage)).await;
    runtime.dispatch(Command::of(CommandType::PreviousPage)).await;

    let pages: Vec<_> = collected
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            ReaderEvent::Pagination(page) if page.kind == PaginationEventKind::PageChanged => {
                Some((page.current_page, page.total_pages))
            }
            _ => None,
        })
        .collect();
    assert_eq!(pages, vec![(2, 3), (1, 3)]);
    assert!(runtime.state().is_reading());
}

#[tokio::test]
async fn next_page_at_last_page_chains_into_next_chapter() {
    // Default page size keeps the whole chapter on one page.
    let (runtime, _collected) = runtime_with(MockApi::with_chapters(4), CoreConfig::default());
    runtime.dispatch(Command::select_book(mock_book(), 0)).await;

    runtime.dispatch(Command::of(CommandType::NextPage)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let session = runtime.store().session().expect("session survives");
    assert_eq!(session.current_chapter_index, 1);
    assert_eq!(session.current_content.as_deref(), Some("chapter 1 text"));
}

#[tokio::test]
async fn previous_page_at_first_page_chains_into_previous_chapter() {
    let (runtime, _collected) = runtime_with(MockApi::with_chapters(4), CoreConfig::default());
    runtime.dispatch(Command::select_book(mock_book(), 2)).await;

    runtime
        .dispatch(Command::of(CommandType::PreviousPage))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let session = runtime.store().session().expect("session survives");
    assert_eq!(session.current_chapter_index, 1);
}

#[tokio::test]
async fn page_turn_without_a_session_fails() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(1), CoreConfig::default());

    runtime.dispatch(Command::of(CommandType::NextPage)).await;

    let message = last_failure_message(&collected).expect("failure message");
    assert!(message.contains("no active"), "unexpected message: {message}");
}

#[tokio::test]
async fn unregistered_command_type_fails_cleanly() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(1), CoreConfig::default());
    runtime.registry().unregister(CommandType::ToggleReadingMode);

    runtime
        .dispatch(Command::of(CommandType::ToggleReadingMode))
        .await;

    let statuses = command_statuses(&collected);
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].0, CommandStatus::Failed);
    assert!(
        statuses[0]
            .1
            .as_deref()
            .is_some_and(|message| message.contains("no handler registered"))
    );
}

#[tokio::test]
async fn every_dispatch_frames_one_started_and_one_terminal_event() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(3), CoreConfig::default());
    seed_session(&runtime, 3, 2);

    // One success, one business failure.
    runtime
        .dispatch(Command::of(CommandType::ToggleReadingMode))
        .await;
    runtime.dispatch(Command::of(CommandType::NextChapter)).await;

    let statuses: Vec<_> = command_statuses(&collected)
        .iter()
        .map(|(status, _)| *status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            CommandStatus::Started,
            CommandStatus::Success,
            CommandStatus::Started,
            CommandStatus::Failed
        ]
    );
}

#[tokio::test]
async fn successful_load_schedules_a_progress_sync() {
    let api = Arc::new(MockApi::with_chapters(5));
    let runtime = ReaderRuntime::new(Arc::clone(&api) as Arc<dyn ContentApi>, CoreConfig::default());
    seed_session(&runtime, 5, 0);

    runtime.dispatch(Command::of(CommandType::NextChapter)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let saved = api.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].dur_chapter_index, 1);
    assert_eq!(saved[0].dur_chapter_pos, 0);
    assert_eq!(saved[0].name, "Mock Book");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_chapter_commands_never_clobber_the_index() {
    let (runtime, collected) = runtime_with(MockApi::with_chapters(2000), CoreConfig::default());
    let runtime = Arc::new(runtime);
    seed_session(&runtime, 2000, 0);

    for _ in 0..400 {
        let first = {
            let runtime = Arc::clone(&runtime);
            tokio::spawn(async move {
                runtime.dispatch(Command::of(CommandType::NextChapter)).await;
            })
        };
        let second = {
            let runtime = Arc::clone(&runtime);
            tokio::spawn(async move {
                runtime.dispatch(Command::of(CommandType::NextChapter)).await;
            })
        };
        first.await.unwrap();
        second.await.unwrap();
    }

    // A command that lost the loading claim must not have touched the
    // store, so the index advances exactly once per successful dispatch.
    let successes = command_statuses(&collected)
        .iter()
        .filter(|(status, _)| *status == CommandStatus::Success)
        .count();
    assert_eq!(runtime.store().current_chapter_index(), Some(successes));
    assert!(runtime.state().is_reading());
}

#[tokio::test]
async fn select_book_restores_the_saved_chapter_position() {
    let api = Arc::new(MockApi::with_chapters(5));
    let runtime =
        ReaderRuntime::new(Arc::clone(&api) as Arc<dyn ContentApi>, CoreConfig::default());
    let collected: Collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    runtime.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    let book = Book {
        dur_chapter_index: 2,
        dur_chapter_pos: 120,
        ..mock_book()
    };
    runtime.dispatch(Command::select_book(book, 2)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let loaded = collected
        .lock()
        .unwrap()
        .iter()
        .find_map(|event| match event {
            ReaderEvent::Reading(reading) if reading.kind == ReadingEventKind::ChapterLoaded => {
                Some(reading.clone())
            }
            _ => None,
        })
        .expect("chapter loaded event");
    assert_eq!(loaded.chapter_position, Some(120));

    let saved = api.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].dur_chapter_index, 2);
    assert_eq!(saved[0].dur_chapter_pos, 120);
}

#[tokio::test]
async fn select_book_at_a_different_chapter_starts_from_position_zero() {
    let api = Arc::new(MockApi::with_chapters(5));
    let runtime =
        ReaderRuntime::new(Arc::clone(&api) as Arc<dyn ContentApi>, CoreConfig::default());

    let book = Book {
        dur_chapter_index: 2,
        dur_chapter_pos: 120,
        ..mock_book()
    };
    runtime.dispatch(Command::select_book(book, 4)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let saved = api.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].dur_chapter_index, 4);
    assert_eq!(saved[0].dur_chapter_pos, 0);
}
