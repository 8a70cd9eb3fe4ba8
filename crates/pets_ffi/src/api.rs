//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose the record store entry points to the UI layer via FRB.
//! - Flatten core errors into plain envelopes the UI can surface.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens its own connection; SQLite serializes writers.
//! - `error_kind` is one of `validation|not_found|storage` when `ok=false`.

use pets_core::db::open_db;
use pets_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, Gender, NewPet,
    PetChanges, PetColumn, PetRecord, PetSchema, PetService, PetSort, RepoError, RepoResult,
    ResourceShape, SortDirection, SqlitePetStore,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const PETS_DB_FILE_NAME: &str = "pets.db";
const PETS_DB_PATH_ENV: &str = "PETS_DB_PATH";
static PETS_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database file used by every later call.
///
/// # FFI contract
/// - Must run before the first store call to take effect.
/// - Returns empty string on success, or an error when a different path is
///   already in use.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = PETS_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "db path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Pet row shaped for list/detail displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetItem {
    pub id: i64,
    pub name: String,
    /// Raw breed, `None` when unknown.
    pub breed: Option<String>,
    /// Breed or the "Unknown breed" label.
    pub breed_label: String,
    /// Gender code (`0|1|2`).
    pub gender: i64,
    pub gender_label: String,
    pub weight: i64,
}

/// Read response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetListResponse {
    pub ok: bool,
    pub items: Vec<PetItem>,
    pub error_kind: Option<String>,
    pub message: String,
}

/// Write response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetActionResponse {
    pub ok: bool,
    /// Created pet id (insert flows only).
    pub pet_id: Option<i64>,
    pub affected_rows: u64,
    pub error_kind: Option<String>,
    pub message: String,
}

impl PetActionResponse {
    fn created(pet_id: i64) -> Self {
        Self {
            ok: true,
            pet_id: Some(pet_id),
            affected_rows: 1,
            error_kind: None,
            message: "Pet saved.".to_string(),
        }
    }

    fn affected(rows: usize, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            pet_id: None,
            affected_rows: rows as u64,
            error_kind: None,
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: &StoreCallError) -> Self {
        Self {
            ok: false,
            pet_id: None,
            affected_rows: 0,
            error_kind: Some(err.kind().to_string()),
            message: format!("{operation} failed: {err}"),
        }
    }
}

/// Ensures the pet table exists in the configured database.
#[flutter_rust_bridge::frb(sync)]
pub fn pets_initialize() -> PetActionResponse {
    match with_pet_service(|service| service.initialize()) {
        Ok(()) => PetActionResponse::affected(0, "Store ready."),
        Err(err) => PetActionResponse::failure("pets_initialize", &err),
    }
}

/// Lists all pets.
///
/// Input semantics:
/// - `sort_column`: one of `id|name|breed|gender|weight`; `None` keeps id order.
/// - `descending`: direction for `sort_column`, ignored without it.
#[flutter_rust_bridge::frb(sync)]
pub fn pets_list(sort_column: Option<String>, descending: bool) -> PetListResponse {
    let sort = match sort_column.as_deref() {
        Some(raw) => match parse_sort_column(raw) {
            Some(column) => {
                let direction = if descending {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                Some(PetSort::default().then(column, direction))
            }
            None => {
                return PetListResponse {
                    ok: false,
                    items: Vec::new(),
                    error_kind: Some("validation".to_string()),
                    message: format!("pets_list failed: unknown sort column `{raw}`"),
                };
            }
        },
        None => None,
    };

    match with_pet_service(|service| service.list_pets(sort.as_ref())) {
        Ok(pets) => {
            let message = format!("Found {} pet(s).", pets.len());
            PetListResponse {
                ok: true,
                items: pets.into_iter().map(to_pet_item).collect(),
                error_kind: None,
                message,
            }
        }
        Err(err) => list_failure("pets_list", &err),
    }
}

/// Gets one pet by id. A missing id yields `error_kind = not_found`.
#[flutter_rust_bridge::frb(sync)]
pub fn pets_get(id: i64) -> PetListResponse {
    match with_pet_service(|service| service.get_pet(id)) {
        Ok(pet) => PetListResponse {
            ok: true,
            items: vec![to_pet_item(pet)],
            error_kind: None,
            message: "Found 1 pet(s).".to_string(),
        },
        Err(err) => list_failure("pets_get", &err),
    }
}

/// Creates a pet from editor input.
///
/// Blank `breed` is stored as unknown (`NULL`).
#[flutter_rust_bridge::frb(sync)]
pub fn pets_insert(
    name: Option<String>,
    breed: Option<String>,
    gender: Option<i64>,
    weight: Option<i64>,
) -> PetActionResponse {
    let candidate = NewPet {
        name: name.map(|value| value.trim().to_string()),
        breed: normalize_breed(breed),
        gender,
        weight,
    };
    match with_pet_service(|service| service.create_pet(&candidate)) {
        Ok(id) => PetActionResponse::created(id),
        Err(err) => PetActionResponse::failure("pets_insert", &err),
    }
}

/// Inserts the fixed sample pet (Toto, Terrier, male, 7).
#[flutter_rust_bridge::frb(sync)]
pub fn pets_insert_sample() -> PetActionResponse {
    match with_pet_service(|service| service.insert_sample_pet()) {
        Ok(id) => PetActionResponse::created(id),
        Err(err) => PetActionResponse::failure("pets_insert_sample", &err),
    }
}

/// Applies a partial edit to one pet. `None` fields are left untouched.
///
/// `clear_breed = true` stores an unknown breed regardless of `breed`.
#[flutter_rust_bridge::frb(sync)]
pub fn pets_update(
    id: i64,
    name: Option<String>,
    breed: Option<String>,
    clear_breed: bool,
    gender: Option<i64>,
    weight: Option<i64>,
) -> PetActionResponse {
    let breed = if clear_breed {
        Some(None)
    } else {
        breed.map(|value| normalize_breed(Some(value)))
    };
    let changes = PetChanges {
        name: name.map(|value| value.trim().to_string()),
        breed,
        gender,
        weight,
    };
    match with_pet_service(|service| service.update_pet(id, &changes)) {
        Ok(rows) => PetActionResponse::affected(rows, format!("Updated {rows} pet(s).")),
        Err(err) => PetActionResponse::failure("pets_update", &err),
    }
}

/// Deletes one pet. A missing id succeeds with zero rows.
#[flutter_rust_bridge::frb(sync)]
pub fn pets_delete(id: i64) -> PetActionResponse {
    match with_pet_service(|service| service.delete_pet(id)) {
        Ok(rows) => PetActionResponse::affected(rows, format!("Deleted {rows} pet(s).")),
        Err(err) => PetActionResponse::failure("pets_delete", &err),
    }
}

/// Deletes every pet.
#[flutter_rust_bridge::frb(sync)]
pub fn pets_delete_all() -> PetActionResponse {
    match with_pet_service(|service| service.delete_all()) {
        Ok(rows) => PetActionResponse::affected(rows, format!("Deleted {rows} pet(s).")),
        Err(err) => PetActionResponse::failure("pets_delete_all", &err),
    }
}

/// Content type for the collection (`id = None`) or one item.
#[flutter_rust_bridge::frb(sync)]
pub fn pets_content_type(id: Option<i64>) -> String {
    match id {
        Some(_) => ResourceShape::Item.content_type(),
        None => ResourceShape::Collection.content_type(),
    }
}

/// Failure from opening the store or from the store call itself.
enum StoreCallError {
    Open(String),
    Repo(RepoError),
}

impl StoreCallError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Open(_) => "storage",
            Self::Repo(err) => err.kind(),
        }
    }
}

impl std::fmt::Display for StoreCallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(message) => write!(f, "{message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

fn list_failure(operation: &str, err: &StoreCallError) -> PetListResponse {
    PetListResponse {
        ok: false,
        items: Vec::new(),
        error_kind: Some(err.kind().to_string()),
        message: format!("{operation} failed: {err}"),
    }
}

fn resolve_db_path() -> PathBuf {
    PETS_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(PETS_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(PETS_DB_FILE_NAME)
        })
        .clone()
}

fn with_pet_service<T>(
    f: impl FnOnce(&PetService<SqlitePetStore<'_>>) -> RepoResult<T>,
) -> Result<T, StoreCallError> {
    let schema = PetSchema::default();
    let conn = open_db(resolve_db_path(), &schema)
        .map_err(|err| StoreCallError::Open(format!("pets DB open failed: {err}")))?;
    let store = SqlitePetStore::try_new(&conn, schema).map_err(StoreCallError::Repo)?;
    let service = PetService::new(store);
    f(&service).map_err(StoreCallError::Repo)
}

fn normalize_breed(breed: Option<String>) -> Option<String> {
    breed
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_sort_column(raw: &str) -> Option<PetColumn> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "id" | "_id" => Some(PetColumn::Id),
        "name" => Some(PetColumn::Name),
        "breed" => Some(PetColumn::Breed),
        "gender" => Some(PetColumn::Gender),
        "weight" => Some(PetColumn::Weight),
        _ => None,
    }
}

fn to_pet_item(pet: PetRecord) -> PetItem {
    let breed_label = pet.breed_label().to_string();
    let gender: Gender = pet.gender;
    PetItem {
        id: pet.id,
        name: pet.name,
        breed: pet.breed,
        breed_label,
        gender: gender.code(),
        gender_label: gender.label().to_string(),
        weight: pet.weight,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        configure_db_path, core_version, init_logging, pets_content_type, pets_delete, pets_get,
        pets_initialize, pets_insert, pets_insert_sample, pets_list, pets_update,
    };
    use std::path::PathBuf;
    use std::sync::Once;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/pets-logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn insert_then_get_returns_display_labels() {
        use_test_db();
        assert!(pets_initialize().ok);
        let name = unique_token("pet");
        let created = pets_insert(Some(name.clone()), Some("  ".to_string()), Some(2), None);
        assert!(created.ok, "{}", created.message);
        let id = created.pet_id.expect("insert should return pet_id");

        let response = pets_get(id);
        assert!(response.ok, "{}", response.message);
        let item = &response.items[0];
        assert_eq!(item.name, name);
        assert_eq!(item.breed, None);
        assert_eq!(item.breed_label, "Unknown breed");
        assert_eq!(item.gender_label, "Female");
        assert_eq!(item.weight, 0);
    }

    #[test]
    fn insert_rejects_invalid_gender_as_validation() {
        use_test_db();
        let response = pets_insert(Some("Rex".to_string()), None, Some(5), Some(3));
        assert!(!response.ok);
        assert_eq!(response.error_kind.as_deref(), Some("validation"));
        assert!(response.message.contains("gender"));
    }

    #[test]
    fn update_and_delete_report_affected_rows() {
        use_test_db();
        let created = pets_insert_sample();
        assert!(created.ok, "{}", created.message);
        let id = created.pet_id.expect("sample insert should return pet_id");

        let updated = pets_update(id, None, None, true, None, Some(9));
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.affected_rows, 1);
        let item = pets_get(id).items.remove(0);
        assert_eq!(item.weight, 9);
        assert_eq!(item.breed, None);

        let noop = pets_update(id, None, None, false, None, None);
        assert!(noop.ok);
        assert_eq!(noop.affected_rows, 0);

        assert_eq!(pets_delete(id).affected_rows, 1);
        let missing = pets_delete(id);
        assert!(missing.ok);
        assert_eq!(missing.affected_rows, 0);

        let gone = pets_get(id);
        assert!(!gone.ok);
        assert_eq!(gone.error_kind.as_deref(), Some("not_found"));
    }

    #[test]
    fn list_rejects_unknown_sort_column_and_sorts_by_weight() {
        use_test_db();
        let response = pets_list(Some("color".to_string()), false);
        assert!(!response.ok);
        assert_eq!(response.error_kind.as_deref(), Some("validation"));

        for weight in [3, 11, 7] {
            let created = pets_insert(Some(unique_token("heavy")), None, Some(0), Some(weight));
            assert!(created.ok, "{}", created.message);
        }

        let sorted = pets_list(Some("weight".to_string()), true);
        assert!(sorted.ok, "{}", sorted.message);
        assert!(sorted
            .items
            .windows(2)
            .all(|pair| pair[0].weight >= pair[1].weight));
    }

    #[test]
    fn content_types_distinguish_item_and_collection() {
        assert!(pets_content_type(None).starts_with("vnd.android.cursor.dir/"));
        assert!(pets_content_type(Some(1)).starts_with("vnd.android.cursor.item/"));
    }

    #[test]
    fn configure_db_path_refuses_to_switch() {
        use_test_db();
        assert_eq!(configure_db_path(test_db_path().display().to_string()), "");
        let error = configure_db_path("/tmp/pets-other.db".to_string());
        assert!(error.contains("refusing to switch"));
        assert!(!configure_db_path("   ".to_string()).is_empty());
    }

    fn test_db_path() -> PathBuf {
        std::env::temp_dir().join(format!("pets-ffi-test-{}.db", std::process::id()))
    }

    /// Pins every store call in this test binary to a fresh per-process file.
    fn use_test_db() {
        static CONFIGURED: Once = Once::new();
        CONFIGURED.call_once(|| {
            let path = test_db_path();
            let _ = std::fs::remove_file(&path);
            assert_eq!(configure_db_path(path.display().to_string()), "");
        });
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
