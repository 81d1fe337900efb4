//! One asset-editing session: load, reconcile, edit, save

use std::path::Path;
use std::sync::mpsc;
use std::thread;

use tracing::{debug, warn};

use paintshop_assets::load_asset;
use paintshop_core::{
    AssetLoadError, ColorOverride, ColorOverrideStore, Generation, LoadController, LoadState,
    PaintError, SurfaceNode, SurfaceRegistry,
};
use paintshop_integration::{
    CreateModelRequest, IntegrationClient, IntegrationError, PendingRequest, StoredModel,
    UpdateModelRequest,
};

/// What a finished save persisted. Handed to the caller so its model listing
/// can be updated in place instead of refetching the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRecord {
    /// `None` after a first save: the legacy create endpoint acknowledges
    /// without echoing the new record id back.
    pub model_id: Option<i64>,
    pub name: String,
    pub asset_path: String,
    pub colors: Vec<ColorOverride>,
}

/// Notifications drained from [`EditorSession::poll`].
#[derive(Debug)]
pub enum SessionEvent {
    /// A load finished; the registry and store are ready for edits.
    RegistryReady,
    LoadFailed(AssetLoadError),
    /// The stored record could not be fetched at all.
    RecordFetchFailed(IntegrationError),
    /// The stored record could not be used. If its asset path was readable
    /// the asset still loads, with an empty override set.
    RecordMalformed(IntegrationError),
    /// Saved colors referenced materials the loaded asset no longer has.
    AssetDrift(Vec<ColorOverride>),
    Saved(SavedRecord),
    /// The attempted payload is retained; `retry_save` resubmits it.
    SaveFailed(IntegrationError),
}

enum SavePayload {
    Create(CreateModelRequest),
    Update(i64, UpdateModelRequest),
}

struct InFlightSave {
    payload: SavePayload,
    pending: PendingRequest<()>,
}

type LoadResult = Result<Vec<SurfaceNode>, AssetLoadError>;

/// Drives one asset-editing session. Single-threaded cooperative model:
/// call [`poll`](Self::poll) once per tick; background work resolves into
/// state transitions there and never in between.
pub struct EditorSession {
    client: IntegrationClient,
    controller: LoadController,
    model_id: Option<i64>,
    model_name: String,
    /// Record fetch in flight for `open_model`; the asset load it names
    /// starts once it resolves.
    pending_record: Option<PendingRequest<StoredModel>>,
    /// Saved overrides belonging to the most recent `begin_load`.
    pending_overrides: Vec<ColorOverride>,
    loads: Vec<(Generation, mpsc::Receiver<LoadResult>)>,
    in_flight_save: Option<InFlightSave>,
    retained_payload: Option<SavePayload>,
}

impl EditorSession {
    pub fn new(client: IntegrationClient) -> Self {
        Self {
            client,
            controller: LoadController::new(),
            model_id: None,
            model_name: String::new(),
            pending_record: None,
            pending_overrides: Vec::new(),
            loads: Vec::new(),
            in_flight_save: None,
            retained_payload: None,
        }
    }

    /// Start painting a fresh asset: no record yet, every material gets the
    /// default color once the load finishes.
    pub fn open_new(&mut self, asset_path: impl Into<String>) {
        self.model_id = None;
        self.model_name.clear();
        self.pending_record = None;
        self.pending_overrides.clear();
        self.loads.clear();
        self.spawn_load(asset_path.into());
    }

    /// Resume painting a saved model: fetch its record, then load the asset
    /// it names and reconcile the saved colors onto it.
    pub fn open_model(&mut self, model_id: i64) {
        self.model_id = Some(model_id);
        self.model_name.clear();
        self.pending_overrides.clear();
        self.loads.clear();
        self.pending_record = Some(self.client.fetch_model(model_id));
    }

    /// Update one material's color. Synchronous; rejected edits change
    /// nothing.
    pub fn set_color(&mut self, material: &str, hexcode: &str) -> Result<(), PaintError> {
        self.controller.set_color(material, hexcode)
    }

    /// Submit the current colors. Creates a record on first save, replaces
    /// the saved colors otherwise. Returns whether a save was started; there
    /// is nothing to save before a load is ready. Overlapping saves are not
    /// queued or deduplicated, the last response wins; callers wanting
    /// stronger ordering can hold off while [`save_in_flight`] is true.
    ///
    /// [`save_in_flight`]: Self::save_in_flight
    pub fn save(&mut self, model_name: &str) -> bool {
        let (Some(registry), Some(store)) = (self.controller.registry(), self.controller.store())
        else {
            debug!("save requested with no ready load, ignoring");
            return false;
        };

        self.model_name = model_name.to_string();
        let payload = match self.model_id {
            Some(id) => SavePayload::Update(id, UpdateModelRequest::new(id, store)),
            None => {
                let asset_path = self.controller.asset_path().unwrap_or_default();
                SavePayload::Create(CreateModelRequest::new(
                    model_name, asset_path, registry, store,
                ))
            }
        };
        self.submit(payload);
        true
    }

    /// Resubmit the payload retained by a failed save, without rebuilding it
    /// from the store. Returns false when there is nothing to retry.
    pub fn retry_save(&mut self) -> bool {
        match self.retained_payload.take() {
            Some(payload) => {
                self.submit(payload);
                true
            }
            None => false,
        }
    }

    pub fn save_in_flight(&self) -> bool {
        self.in_flight_save.is_some()
    }

    /// Whether a failed save left a payload behind for [`retry_save`](Self::retry_save).
    pub fn has_retained_save(&self) -> bool {
        self.retained_payload.is_some()
    }

    pub fn state(&self) -> &LoadState {
        self.controller.state()
    }

    pub fn registry(&self) -> Option<&SurfaceRegistry> {
        self.controller.registry()
    }

    pub fn store(&self) -> Option<&ColorOverrideStore> {
        self.controller.store()
    }

    pub fn model_id(&self) -> Option<i64> {
        self.model_id
    }

    pub fn asset_path(&self) -> Option<&str> {
        self.controller.asset_path()
    }

    pub fn client(&self) -> &IntegrationClient {
        &self.client
    }

    /// Drain finished background work into state transitions and events.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.poll_record_fetch(&mut events);
        self.poll_loads(&mut events);
        self.poll_save(&mut events);
        events
    }

    fn poll_record_fetch(&mut self, events: &mut Vec<SessionEvent>) {
        let Some(pending) = &self.pending_record else {
            return;
        };
        let Some(result) = pending.try_recv() else {
            return;
        };
        self.pending_record = None;

        match result {
            Ok(record) => {
                self.model_name = record.name.clone();
                let asset_path = record.filepath.clone();
                match record.into_persisted() {
                    Ok(persisted) => {
                        self.pending_overrides = persisted.entries;
                    }
                    Err(err) => {
                        // The asset path was readable even though the
                        // painted rows were not: load anyway, unpainted.
                        warn!("stored record is unusable, continuing without saved colors: {}", err);
                        self.pending_overrides.clear();
                        events.push(SessionEvent::RecordMalformed(err));
                    }
                }
                self.spawn_load(asset_path);
            }
            Err(err @ IntegrationError::MalformedRecord(_)) => {
                // Without a trustworthy asset path there is nothing to load;
                // the caller can reopen or start over.
                warn!("stored record is malformed: {}", err);
                events.push(SessionEvent::RecordMalformed(err));
            }
            Err(err) => {
                warn!("could not fetch model record: {}", err);
                events.push(SessionEvent::RecordFetchFailed(err));
            }
        }
    }

    fn poll_loads(&mut self, events: &mut Vec<SessionEvent>) {
        let mut finished: Vec<(Generation, LoadResult)> = Vec::new();
        let mut index = 0;
        while index < self.loads.len() {
            match self.loads[index].1.try_recv() {
                Ok(result) => {
                    let (generation, _) = self.loads.remove(index);
                    finished.push((generation, result));
                }
                Err(mpsc::TryRecvError::Empty) => index += 1,
                Err(mpsc::TryRecvError::Disconnected) => {
                    let (generation, _) = self.loads.remove(index);
                    let path = self.controller.asset_path().unwrap_or_default().to_string();
                    finished.push((
                        generation,
                        Err(AssetLoadError::new(path, "load worker disconnected")),
                    ));
                }
            }
        }

        for (generation, result) in finished {
            match result {
                Ok(nodes) => {
                    if self
                        .controller
                        .complete_load(generation, &nodes, &self.pending_overrides)
                    {
                        events.push(SessionEvent::RegistryReady);
                        let unmatched = self.controller.unmatched().to_vec();
                        if !unmatched.is_empty() {
                            events.push(SessionEvent::AssetDrift(unmatched));
                        }
                    }
                }
                Err(error) => {
                    if self.controller.fail_load(generation, error.clone()) {
                        events.push(SessionEvent::LoadFailed(error));
                    }
                }
            }
        }
    }

    fn poll_save(&mut self, events: &mut Vec<SessionEvent>) {
        let Some(save) = self.in_flight_save.take() else {
            return;
        };
        match save.pending.try_recv() {
            None => self.in_flight_save = Some(save),
            Some(Ok(())) => {
                let record = self.saved_record(&save.payload);
                self.retained_payload = None;
                debug!("save finished for '{}'", record.name);
                events.push(SessionEvent::Saved(record));
            }
            Some(Err(err)) => {
                warn!("save failed, payload retained for retry: {}", err);
                self.retained_payload = Some(save.payload);
                events.push(SessionEvent::SaveFailed(err));
            }
        }
    }

    fn spawn_load(&mut self, asset_path: String) {
        let generation = self.controller.begin_load(&asset_path);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = load_asset(Path::new(&asset_path))
                .map(|document| document.surfaces)
                .map_err(|e| AssetLoadError::new(asset_path, e.to_string()));
            let _ = tx.send(result);
        });
        self.loads.push((generation, rx));
    }

    fn submit(&mut self, payload: SavePayload) {
        let pending = match &payload {
            SavePayload::Create(request) => self.client.create_model(request.clone()),
            SavePayload::Update(id, request) => self.client.update_model(*id, request.clone()),
        };
        self.in_flight_save = Some(InFlightSave { payload, pending });
    }

    fn saved_record(&self, payload: &SavePayload) -> SavedRecord {
        match payload {
            SavePayload::Create(request) => SavedRecord {
                model_id: None,
                name: request.model_name.clone(),
                asset_path: request.model_filepath.clone(),
                colors: request
                    .colors
                    .iter()
                    .map(|c| ColorOverride::new(c.color_material.clone(), c.color_hexcode.clone()))
                    .collect(),
            },
            SavePayload::Update(id, request) => SavedRecord {
                model_id: Some(*id),
                name: self.model_name.clone(),
                asset_path: self.controller.asset_path().unwrap_or_default().to_string(),
                colors: request
                    .painted_models
                    .iter()
                    .map(|entry| {
                        ColorOverride::new(entry.color.material.clone(), entry.color.hexcode.clone())
                    })
                    .collect(),
            },
        }
    }
}
