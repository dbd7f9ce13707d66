//! The viewer actor. Every UI event, playback tick and network completion is
//! a message handled on its single event loop.

use std::{any::Any, marker::PhantomData, sync::Arc, time::Duration};

use actors::{
    actor::{Actor, SupervisionStrategy},
    actor_ref::Context,
    handler::{Handler, Message},
    schedule::{self, Repeat},
};
use async_trait::async_trait;
use chrono::Utc;
use lifelog_api::{ensure_json_file, ApiResult, LocationQuery, LocationService, PlaceSearch};
use map::{Camera, MapSurface, Marker};
use model::{
    location::LocationPoint,
    place::{Coordinate, Endpoint, Place},
    StatusMessage,
};
use serde::Serialize;
use tokio::{task::JoinHandle, time};

use crate::{
    controller::{LoadOutcome, PlaybackController, Step},
    synth,
    task::TaskHandle,
    trip::TripDraft,
};

pub const FETCHING_STATUS: &str = "Fetching data...";
pub const LOAD_ERROR_STATUS: &str = "Error loading data. backend running?";
pub const SEARCH_ZOOM: f64 = 10.0;

/// Background work started by a message. It completes once its result has
/// been handed back to the viewer.
pub type Pending = JoinHandle<()>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerSettings {
    /// Period of the playback ticks, one display refresh.
    pub frame_interval: Duration,
    pub demo_autoplay_delay: Duration,
    pub reload_delay: Duration,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            demo_autoplay_delay: Duration::from_secs(1),
            reload_delay: Duration::from_millis(500),
        }
    }
}

pub struct Viewer<S: MapSurface> {
    controller: PlaybackController<S>,
    locations: Arc<dyn LocationService>,
    places: Arc<dyn PlaceSearch>,
    settings: ViewerSettings,
    draft: TripDraft,
    // bumped whenever the dashboard opens or closes; late search results
    // from an earlier session are dropped
    session: u64,
    status: String,
    notice: Option<String>,
}

/// Everything a front-end shows, taken at one point of the event loop.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState<F> {
    pub status: String,
    pub notice: Option<String>,
    pub playing: bool,
    pub cursor: usize,
    pub length: usize,
    pub distance_km: f64,
    pub map: F,
    pub dashboard: TripDraft,
}

impl<S: MapSurface> Viewer<S> {
    pub fn new(
        surface: S,
        locations: Arc<dyn LocationService>,
        places: Arc<dyn PlaceSearch>,
    ) -> Self {
        Self {
            controller: PlaybackController::new(surface),
            locations,
            places,
            settings: ViewerSettings::default(),
            draft: TripDraft::new(),
            session: 0,
            status: String::new(),
            notice: None,
        }
    }

    pub fn with_settings(mut self, settings: ViewerSettings) -> Self {
        self.settings = settings;
        self
    }

    fn reload(&mut self, ctx: &Context<Self>) -> Pending {
        self.status = FETCHING_STATUS.to_owned();
        let locations = self.locations.clone();
        ctx.notify_when(async move {
            LocationsFetched(locations.fetch_locations(&LocationQuery::all()).await)
        })
    }

    fn start_playback(&mut self, ctx: &Context<Self>) -> bool {
        let Some(handle) = self.controller.play() else {
            return false;
        };
        let token = handle.token();
        schedule::repeat(ctx.weak(), self.settings.frame_interval, token, move || {
            Advance(handle.clone())
        });
        true
    }

    fn reset_dashboard(&mut self) {
        self.draft.close();
        self.session += 1;
        let surface = self.controller.surface_mut();
        surface.remove_marker(Endpoint::Start);
        surface.remove_marker(Endpoint::End);
    }

    fn view_state(&self) -> ViewState<S::Frame> {
        let sequence = self.controller.sequence();
        ViewState {
            status: self.status.clone(),
            notice: self.notice.clone(),
            playing: self.controller.is_playing(),
            cursor: self.controller.cursor(),
            length: sequence.len(),
            distance_km: sequence.distance_km(),
            map: self.controller.surface().frame(),
            dashboard: self.draft.clone(),
        }
    }
}

impl<S: MapSurface> Actor for Viewer<S> {
    fn on_fail(&mut self, _: Box<dyn Any + Send>) -> SupervisionStrategy {
        SupervisionStrategy::Resume
    }
}

/// Fetches the whole location history.
#[derive(Debug, Clone)]
pub struct Reload;

impl Message for Reload {
    type Response = Pending;
}

#[async_trait]
impl<S: MapSurface> Handler<Reload> for Viewer<S> {
    async fn handle(&mut self, _: Reload, ctx: &Context<Self>) -> Pending {
        self.reload(ctx)
    }
}

#[derive(Debug, Clone)]
pub struct LocationsFetched(pub ApiResult<Vec<LocationPoint>>);

impl Message for LocationsFetched {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<LocationsFetched> for Viewer<S> {
    async fn handle(&mut self, message: LocationsFetched, _: &Context<Self>) {
        match message.0 {
            Ok(points) => {
                let count = points.len();
                if self.controller.load(points) == LoadOutcome::Empty {
                    log::info!("location service has no points yet");
                }
                self.status = format!("Loaded {} points", count);
            }
            Err(why) => {
                log::error!("could not load locations: {}", why);
                self.status = LOAD_ERROR_STATUS.to_owned();
            }
        }
    }
}

/// Loads the demo tour and starts playing it shortly after.
#[derive(Debug, Clone)]
pub struct GenerateDemo;

impl Message for GenerateDemo {
    type Response = Pending;
}

#[async_trait]
impl<S: MapSurface> Handler<GenerateDemo> for Viewer<S> {
    async fn handle(&mut self, _: GenerateDemo, ctx: &Context<Self>) -> Pending {
        log::info!("generating demo path");
        let points = synth::demo_path(Utc::now());
        let count = points.len();
        self.controller.load(points);
        self.status = format!("Loaded {} demo points", count);

        let delay = self.settings.demo_autoplay_delay;
        ctx.notify_when(async move {
            time::sleep(delay).await;
            PlayIfIdle
        })
    }
}

#[derive(Debug, Clone)]
pub struct Play;

impl Message for Play {
    type Response = bool;
}

#[async_trait]
impl<S: MapSurface> Handler<Play> for Viewer<S> {
    async fn handle(&mut self, _: Play, ctx: &Context<Self>) -> bool {
        self.controller.is_playing() || self.start_playback(ctx)
    }
}

#[derive(Debug, Clone)]
pub struct PlayIfIdle;

impl Message for PlayIfIdle {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<PlayIfIdle> for Viewer<S> {
    async fn handle(&mut self, _: PlayIfIdle, ctx: &Context<Self>) {
        if !self.controller.is_playing() {
            self.start_playback(ctx);
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pause;

impl Message for Pause {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<Pause> for Viewer<S> {
    async fn handle(&mut self, _: Pause, _: &Context<Self>) {
        self.controller.pause();
    }
}

/// The play/pause button. Answers whether playback is running afterwards.
#[derive(Debug, Clone)]
pub struct TogglePlayback;

impl Message for TogglePlayback {
    type Response = bool;
}

#[async_trait]
impl<S: MapSurface> Handler<TogglePlayback> for Viewer<S> {
    async fn handle(&mut self, _: TogglePlayback, ctx: &Context<Self>) -> bool {
        if self.controller.is_playing() {
            self.controller.pause();
            false
        } else {
            self.start_playback(ctx)
        }
    }
}

/// The slider.
#[derive(Debug, Clone)]
pub struct SetCursor(pub i64);

impl Message for SetCursor {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<SetCursor> for Viewer<S> {
    async fn handle(&mut self, message: SetCursor, _: &Context<Self>) {
        self.controller.set_cursor(message.0);
    }
}

#[derive(Debug, Clone)]
pub struct Advance(pub TaskHandle);

impl Message for Advance {
    type Response = Repeat;
}

#[async_trait]
impl<S: MapSurface> Handler<Advance> for Viewer<S> {
    async fn handle(&mut self, message: Advance, _: &Context<Self>) -> Repeat {
        match self.controller.advance(&message.0) {
            Step::Continue => Repeat::Again,
            Step::Finished | Step::Stale => Repeat::Stop,
        }
    }
}

/// A location export picked by the user. Anything but `.json` is refused
/// without contacting the service.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl Message for Upload {
    type Response = Option<Pending>;
}

#[async_trait]
impl<S: MapSurface> Handler<Upload> for Viewer<S> {
    async fn handle(&mut self, message: Upload, ctx: &Context<Self>) -> Option<Pending> {
        let Upload { file_name, content } = message;
        if let Err(why) = ensure_json_file(&file_name) {
            self.notice = Some(format!("Upload failed: {}", why));
            return None;
        }

        log::info!("uploading {} ({} bytes)", file_name, content.len());
        self.status = format!("Uploading {}...", file_name);
        let locations = self.locations.clone();
        Some(ctx.notify_when(async move {
            Uploaded(locations.upload(&file_name, content).await)
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Uploaded(pub ApiResult<StatusMessage>);

impl Message for Uploaded {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<Uploaded> for Viewer<S> {
    async fn handle(&mut self, message: Uploaded, ctx: &Context<Self>) {
        match message.0 {
            Ok(answer) => {
                log::info!("upload accepted: {}", answer.message);
                self.reload(ctx);
                self.notice = Some(answer.message);
            }
            Err(why) => {
                log::error!("upload failed: {}", why);
                self.notice = Some(format!("Upload failed: {}", why));
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenDashboard;

impl Message for OpenDashboard {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<OpenDashboard> for Viewer<S> {
    async fn handle(&mut self, _: OpenDashboard, _: &Context<Self>) {
        self.reset_dashboard();
        self.draft.open();
    }
}

#[derive(Debug, Clone)]
pub struct CancelDashboard;

impl Message for CancelDashboard {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<CancelDashboard> for Viewer<S> {
    async fn handle(&mut self, _: CancelDashboard, _: &Context<Self>) {
        self.reset_dashboard();
    }
}

/// Arms the next map click for one endpoint.
#[derive(Debug, Clone)]
pub struct Pick(pub Endpoint);

impl Message for Pick {
    type Response = bool;
}

#[async_trait]
impl<S: MapSurface> Handler<Pick> for Viewer<S> {
    async fn handle(&mut self, message: Pick, _: &Context<Self>) -> bool {
        self.draft.pick(message.0)
    }
}

#[derive(Debug, Clone)]
pub struct MapClick(pub Coordinate);

impl Message for MapClick {
    type Response = Option<Endpoint>;
}

#[async_trait]
impl<S: MapSurface> Handler<MapClick> for Viewer<S> {
    async fn handle(&mut self, message: MapClick, _: &Context<Self>) -> Option<Endpoint> {
        let endpoint = self.draft.click(message.0)?;
        self.controller
            .surface_mut()
            .place_marker(Marker::new(endpoint, message.0));
        Some(endpoint)
    }
}

#[derive(Debug, Clone)]
pub struct Search {
    pub endpoint: Endpoint,
    pub query: String,
}

impl Message for Search {
    type Response = Option<Pending>;
}

#[async_trait]
impl<S: MapSurface> Handler<Search> for Viewer<S> {
    async fn handle(&mut self, message: Search, ctx: &Context<Self>) -> Option<Pending> {
        let query = message.query.trim().to_owned();
        if !self.draft.open || query.is_empty() {
            return None;
        }
        let endpoint = message.endpoint;
        self.draft.searching(endpoint, &query);

        let places = self.places.clone();
        let session = self.session;
        Some(ctx.notify_when(async move {
            let result = places.search(&query).await;
            SearchFinished {
                session,
                endpoint,
                result,
            }
        }))
    }
}

#[derive(Debug, Clone)]
pub struct SearchFinished {
    pub session: u64,
    pub endpoint: Endpoint,
    pub result: ApiResult<Option<Place>>,
}

impl Message for SearchFinished {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<SearchFinished> for Viewer<S> {
    async fn handle(&mut self, message: SearchFinished, _: &Context<Self>) {
        if message.session != self.session || !self.draft.open {
            log::debug!("dropping search result of a closed dashboard");
            return;
        }
        match message.result {
            Ok(Some(place)) => {
                let surface = self.controller.surface_mut();
                surface.place_marker(
                    Marker::new(message.endpoint, place.coordinate).with_popup(&place.name),
                );
                surface.fly_to(Camera::new(place.coordinate, SEARCH_ZOOM));
                self.draft.found(message.endpoint, place);
            }
            Ok(None) => self.draft.not_found(),
            Err(why) => {
                log::error!("place search failed: {}", why);
                self.draft.search_failed();
            }
        }
    }
}

/// Saves a trip between the two chosen endpoints. Answers `None` while an
/// endpoint is missing.
#[derive(Debug, Clone)]
pub struct CreateTrip;

impl Message for CreateTrip {
    type Response = Option<Pending>;
}

#[async_trait]
impl<S: MapSurface> Handler<CreateTrip> for Viewer<S> {
    async fn handle(&mut self, _: CreateTrip, ctx: &Context<Self>) -> Option<Pending> {
        let (start, end) = self.draft.endpoints()?;
        let points = synth::manual_trip(start, end, Utc::now(), &mut rand::thread_rng());
        log::info!("saving trip of {} points from {} to {}", points.len(), start, end);
        self.reset_dashboard();

        let locations = self.locations.clone();
        Some(ctx.notify_when(async move {
            TripSaved(locations.create_locations(&points).await)
        }))
    }
}

#[derive(Debug, Clone)]
pub struct TripSaved(pub ApiResult<StatusMessage>);

impl Message for TripSaved {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<TripSaved> for Viewer<S> {
    async fn handle(&mut self, message: TripSaved, ctx: &Context<Self>) {
        match message.0 {
            Ok(answer) => {
                self.notice = Some(format!("Trip Created Successfully! ({})", answer.message));
                let delay = self.settings.reload_delay;
                ctx.notify_when(async move {
                    time::sleep(delay).await;
                    Reload
                });
            }
            Err(why) => {
                log::error!("could not save trip: {}", why);
                self.notice = Some(format!("Error saving trip: {}", why));
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DismissNotice;

impl Message for DismissNotice {
    type Response = ();
}

#[async_trait]
impl<S: MapSurface> Handler<DismissNotice> for Viewer<S> {
    async fn handle(&mut self, _: DismissNotice, _: &Context<Self>) {
        self.notice = None;
    }
}

pub struct Snapshot<S>(PhantomData<fn() -> S>);

impl<S> Snapshot<S> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<S> Default for Snapshot<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Snapshot<S> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<S: MapSurface> Message for Snapshot<S> {
    type Response = ViewState<S::Frame>;
}

#[async_trait]
impl<S: MapSurface> Handler<Snapshot<S>> for Viewer<S> {
    async fn handle(&mut self, _: Snapshot<S>, _: &Context<Self>) -> ViewState<S::Frame> {
        self.view_state()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    };

    use actors::actor_ref::ActorRef;
    use chrono::{DateTime, Duration as TimeDelta, TimeZone};
    use lifelog_api::ApiError;
    use map::recording::RecordingSurface;

    use super::*;
    use crate::{synth::TRIP_SOURCE, trip::READY_INSTRUCTION};

    #[derive(Default)]
    struct FakeService {
        points: Mutex<Vec<LocationPoint>>,
        offline: AtomicBool,
        fetches: AtomicUsize,
        created: Mutex<Vec<LocationPoint>>,
        uploads: Mutex<Vec<(String, usize)>>,
        latency: Duration,
    }

    impl FakeService {
        fn with_points(points: Vec<LocationPoint>) -> Arc<Self> {
            let service = Self::default();
            *service.points.lock().unwrap() = points;
            Arc::new(service)
        }

        fn check(&self) -> ApiResult<()> {
            if self.offline.load(Ordering::SeqCst) {
                Err(ApiError::Other("connection refused".to_owned()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl LocationService for FakeService {
        async fn fetch_locations(&self, _: &LocationQuery) -> ApiResult<Vec<LocationPoint>> {
            self.check()?;
            if !self.latency.is_zero() {
                time::sleep(self.latency).await;
            }
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.points.lock().unwrap().clone())
        }

        async fn create_locations(&self, points: &[LocationPoint]) -> ApiResult<StatusMessage> {
            self.check()?;
            self.created.lock().unwrap().extend_from_slice(points);
            Ok(StatusMessage::new(format!("Added {} points", points.len())))
        }

        async fn upload(&self, file_name: &str, content: Vec<u8>) -> ApiResult<StatusMessage> {
            self.check()?;
            self.uploads
                .lock()
                .unwrap()
                .push((file_name.to_owned(), content.len()));
            Ok(StatusMessage::new("Imported 2 points"))
        }
    }

    struct FakeSearch;

    #[async_trait]
    impl PlaceSearch for FakeSearch {
        async fn search(&self, query: &str) -> ApiResult<Option<Place>> {
            match query {
                "Kyoto" => Ok(Some(Place::new(
                    "Kyoto",
                    Coordinate::new(35.0116, 135.7681),
                ))),
                "fail" => Err(ApiError::Other("rate limited".to_owned())),
                _ => Ok(None),
            }
        }
    }

    type TestViewer = ActorRef<Viewer<RecordingSurface>>;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn points(count: usize) -> Vec<LocationPoint> {
        (0..count)
            .map(|i| {
                LocationPoint::new(
                    35.0 + i as f64 * 0.001,
                    135.0,
                    base() + TimeDelta::minutes(i as i64),
                )
            })
            .collect()
    }

    fn spawn_viewer(service: Arc<FakeService>) -> TestViewer {
        actors::spawn(Viewer::new(
            RecordingSurface::new(),
            service,
            Arc::new(FakeSearch),
        ))
    }

    async fn snapshot(viewer: &TestViewer) -> ViewState<RecordingSurface> {
        viewer.ask(Snapshot::<RecordingSurface>::new()).await.unwrap()
    }

    async fn loaded(count: usize) -> (TestViewer, Arc<FakeService>) {
        let service = FakeService::with_points(points(count));
        let viewer = spawn_viewer(service.clone());
        viewer.ask(Reload).await.unwrap().await.unwrap();
        (viewer, service)
    }

    #[tokio::test(start_paused = true)]
    async fn reload_shows_the_whole_history() {
        let mut shuffled = points(3);
        shuffled.reverse();
        let viewer = spawn_viewer(FakeService::with_points(shuffled));
        viewer.ask(Reload).await.unwrap().await.unwrap();

        let state = snapshot(&viewer).await;
        assert_eq!(state.status, "Loaded 3 points");
        assert_eq!(state.length, 3);
        assert_eq!(state.cursor, 2);
        assert!(!state.playing);
        assert_eq!(state.map.path().map(<[_]>::len), Some(3));
        assert_eq!(state.map.date_label(), Some(&(base() + TimeDelta::minutes(2))));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reload_keeps_what_is_shown() {
        let (viewer, service) = loaded(4).await;
        service.offline.store(true, Ordering::SeqCst);
        viewer.ask(Reload).await.unwrap().await.unwrap();

        let state = snapshot(&viewer).await;
        assert_eq!(state.status, LOAD_ERROR_STATUS);
        assert_eq!(state.length, 4);
        assert_eq!(state.cursor, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_history_reports_zero_points() {
        let (viewer, _) = loaded(0).await;
        let state = snapshot(&viewer).await;
        assert_eq!(state.status, "Loaded 0 points");
        assert_eq!(state.length, 0);
        assert!(state.map.draws.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn playback_runs_to_the_end_and_stops() {
        let (viewer, _) = loaded(13).await;
        assert!(viewer.ask(Play).await.unwrap());

        time::sleep(Duration::from_secs(1)).await;
        let state = snapshot(&viewer).await;
        assert!(!state.playing);
        assert_eq!(state.cursor, 12);
        assert_eq!(state.map.path_lengths(), vec![13, 1, 6, 11, 13]);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_the_cursor() {
        let (viewer, _) = loaded(500).await;
        viewer.ask(Play).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        viewer.ask(Pause).await.unwrap();

        let paused = snapshot(&viewer).await;
        assert!(!paused.playing);
        assert!(paused.cursor > 0 && paused.cursor < 499);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(snapshot(&viewer).await.cursor, paused.cursor);
    }

    #[tokio::test(start_paused = true)]
    async fn slider_cancels_playback() {
        let (viewer, _) = loaded(500).await;
        viewer.ask(Play).await.unwrap();
        time::sleep(Duration::from_millis(50)).await;
        viewer.ask(SetCursor(3)).await.unwrap();

        time::sleep(Duration::from_secs(1)).await;
        let state = snapshot(&viewer).await;
        assert!(!state.playing);
        assert_eq!(state.cursor, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_switches_between_play_and_pause() {
        let (viewer, _) = loaded(500).await;
        assert!(viewer.ask(TogglePlayback).await.unwrap());
        assert!(!viewer.ask(TogglePlayback).await.unwrap());
        assert!(!snapshot(&viewer).await.playing);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_to_play_without_points() {
        let viewer = spawn_viewer(Arc::new(FakeService::default()));
        assert!(!viewer.ask(Play).await.unwrap());
        assert!(!viewer.ask(TogglePlayback).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn demo_starts_playing_after_a_second() {
        let viewer = spawn_viewer(Arc::new(FakeService::default()));
        let autoplay = viewer.ask(GenerateDemo).await.unwrap();

        let state = snapshot(&viewer).await;
        assert_eq!(state.status, "Loaded 204 demo points");
        assert_eq!(state.cursor, 203);
        assert!(!state.playing);

        autoplay.await.unwrap();
        let state = snapshot(&viewer).await;
        assert!(state.playing);
        assert!(state.cursor < 203);

        time::sleep(Duration::from_secs(5)).await;
        let state = snapshot(&viewer).await;
        assert!(!state.playing);
        assert_eq!(state.cursor, 203);
    }

    #[tokio::test(start_paused = true)]
    async fn only_json_uploads_are_sent() {
        let service = Arc::new(FakeService::default());
        let viewer = spawn_viewer(service.clone());

        let refused = viewer
            .ask(Upload {
                file_name: "history.kml".to_owned(),
                content: b"<kml/>".to_vec(),
            })
            .await
            .unwrap();
        assert!(refused.is_none());
        let notice = snapshot(&viewer).await.notice.unwrap();
        assert!(notice.starts_with("Upload failed: "));
        assert!(service.uploads.lock().unwrap().is_empty());

        viewer.ask(DismissNotice).await.unwrap();
        let pending = viewer
            .ask(Upload {
                file_name: "history.json".to_owned(),
                content: b"[{}, {}]".to_vec(),
            })
            .await
            .unwrap()
            .unwrap();
        pending.await.unwrap();
        time::sleep(Duration::from_millis(10)).await;

        assert_eq!(
            *service.uploads.lock().unwrap(),
            vec![("history.json".to_owned(), 8)]
        );
        assert_eq!(service.fetches.load(Ordering::SeqCst), 1);
        let state = snapshot(&viewer).await;
        assert_eq!(state.notice.as_deref(), Some("Imported 2 points"));
        assert_eq!(state.status, "Loaded 0 points");
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_upload_message_outlives_the_reload() {
        let service = Arc::new(FakeService {
            latency: Duration::from_secs(1),
            ..FakeService::default()
        });
        let viewer = spawn_viewer(service.clone());

        let pending = viewer
            .ask(Upload {
                file_name: "h.json".to_owned(),
                content: b"[]".to_vec(),
            })
            .await
            .unwrap()
            .unwrap();
        pending.await.unwrap();

        let state = snapshot(&viewer).await;
        assert_eq!(state.status, FETCHING_STATUS);
        assert_eq!(state.notice.as_deref(), Some("Imported 2 points"));

        time::sleep(Duration::from_secs(2)).await;
        let state = snapshot(&viewer).await;
        assert_eq!(state.status, "Loaded 0 points");
        assert_eq!(state.notice.as_deref(), Some("Imported 2 points"));
    }

    #[tokio::test(start_paused = true)]
    async fn reload_reports_fetching_until_the_answer_arrives() {
        let service = Arc::new(FakeService {
            points: Mutex::new(points(3)),
            latency: Duration::from_secs(1),
            ..FakeService::default()
        });
        let viewer = spawn_viewer(service);

        let pending = viewer.ask(Reload).await.unwrap();
        assert_eq!(snapshot(&viewer).await.status, FETCHING_STATUS);

        pending.await.unwrap();
        assert_eq!(snapshot(&viewer).await.status, "Loaded 3 points");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_upload_leaves_a_notice() {
        let service = Arc::new(FakeService::default());
        service.offline.store(true, Ordering::SeqCst);
        let viewer = spawn_viewer(service.clone());

        let pending = viewer
            .ask(Upload {
                file_name: "history.json".to_owned(),
                content: Vec::new(),
            })
            .await
            .unwrap()
            .unwrap();
        pending.await.unwrap();

        let state = snapshot(&viewer).await;
        assert_eq!(
            state.notice.as_deref(),
            Some("Upload failed: connection refused")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn picked_trip_is_saved_and_reloaded() {
        let service = Arc::new(FakeService::default());
        let viewer = spawn_viewer(service.clone());
        let start = Coordinate::new(35.6895, 139.6917);
        let end = Coordinate::new(34.6937, 135.5023);

        viewer.ask(OpenDashboard).await.unwrap();
        assert_eq!(viewer.ask(MapClick(start)).await.unwrap(), None);
        assert!(viewer.ask(Pick(Endpoint::Start)).await.unwrap());
        assert_eq!(
            viewer.ask(MapClick(start)).await.unwrap(),
            Some(Endpoint::Start)
        );
        assert!(viewer.ask(CreateTrip).await.unwrap().is_none());
        viewer.ask(Pick(Endpoint::End)).await.unwrap();
        viewer.ask(MapClick(end)).await.unwrap();

        let state = snapshot(&viewer).await;
        assert_eq!(state.dashboard.instruction, READY_INSTRUCTION);
        let colors = state
            .map
            .markers()
            .iter()
            .map(|marker| marker.color.clone())
            .collect::<Vec<_>>();
        assert_eq!(colors, vec!["#00ff00", "#ff0000"]);

        let pending = viewer.ask(CreateTrip).await.unwrap().unwrap();
        pending.await.unwrap();
        let state = snapshot(&viewer).await;
        assert_eq!(
            state.notice.as_deref(),
            Some("Trip Created Successfully! (Added 51 points)")
        );
        assert_eq!(state.dashboard, TripDraft::new());
        assert!(state.map.markers().is_empty());

        let created = service.created.lock().unwrap().clone();
        assert_eq!(created.len(), 51);
        assert!(created
            .iter()
            .all(|point| point.source.as_deref() == Some(TRIP_SOURCE)));

        assert_eq!(service.fetches.load(Ordering::SeqCst), 0);
        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(service.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_trip_closes_the_dashboard_without_reload() {
        let service = Arc::new(FakeService::default());
        service.offline.store(true, Ordering::SeqCst);
        let viewer = spawn_viewer(service.clone());

        viewer.ask(OpenDashboard).await.unwrap();
        for (endpoint, coordinate) in [
            (Endpoint::Start, Coordinate::new(1.0, 1.0)),
            (Endpoint::End, Coordinate::new(2.0, 2.0)),
        ] {
            viewer.ask(Pick(endpoint)).await.unwrap();
            viewer.ask(MapClick(coordinate)).await.unwrap();
        }
        viewer.ask(CreateTrip).await.unwrap().unwrap().await.unwrap();

        time::sleep(Duration::from_secs(1)).await;
        let state = snapshot(&viewer).await;
        assert_eq!(
            state.notice.as_deref(),
            Some("Error saving trip: connection refused")
        );
        assert!(!state.dashboard.open);
        assert_eq!(service.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn search_sets_the_endpoint_and_flies_there() {
        let viewer = spawn_viewer(Arc::new(FakeService::default()));
        viewer.ask(OpenDashboard).await.unwrap();

        let search = |query: &str| Search {
            endpoint: Endpoint::End,
            query: query.to_owned(),
        };
        assert!(viewer.ask(search("   ")).await.unwrap().is_none());

        viewer.ask(search(" Kyoto ")).await.unwrap().unwrap().await.unwrap();
        let state = snapshot(&viewer).await;
        assert_eq!(state.dashboard.instruction, "Found: Kyoto");
        assert_eq!(state.dashboard.end_input, "Kyoto");
        let camera = state.map.camera().unwrap();
        assert_eq!(camera.center, Coordinate::new(35.0116, 135.7681));
        assert_eq!(camera.zoom, SEARCH_ZOOM);
        let markers = state.map.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].popup.as_deref(), Some("Kyoto"));

        viewer.ask(search("Atlantis")).await.unwrap().unwrap().await.unwrap();
        let state = snapshot(&viewer).await;
        assert_eq!(state.dashboard.instruction, "Location not found. Try again.");

        viewer.ask(search("fail")).await.unwrap().unwrap().await.unwrap();
        let state = snapshot(&viewer).await;
        assert_eq!(state.dashboard.instruction, "Search Error.");
        // the earlier match survives failed searches
        assert!(state.dashboard.end.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn search_needs_an_open_dashboard() {
        let viewer = spawn_viewer(Arc::new(FakeService::default()));
        let pending = viewer
            .ask(Search {
                endpoint: Endpoint::Start,
                query: "Kyoto".to_owned(),
            })
            .await
            .unwrap();
        assert!(pending.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn late_search_results_are_dropped_after_cancel() {
        let viewer = spawn_viewer(Arc::new(FakeService::default()));
        viewer.ask(OpenDashboard).await.unwrap();
        let pending = viewer
            .ask(Search {
                endpoint: Endpoint::Start,
                query: "Kyoto".to_owned(),
            })
            .await
            .unwrap()
            .unwrap();
        viewer.ask(CancelDashboard).await.unwrap();
        pending.await.unwrap();

        let state = snapshot(&viewer).await;
        assert_eq!(state.dashboard, TripDraft::new());
        assert!(state.map.markers().is_empty());
    }
}
