//! CLI command implementations
//!
//! Each command loads the config, opens the forms file, does one thing and
//! writes one JSON response. Request handling is split from stdin/stdout so
//! it can be tested directly.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::ids::{IdGenerator, IdStrategy};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::persistence::{FileFormStore, FormStore};
use crate::schema::{FieldConfig, FormDraft, FormSchema, RuleKind, ValueMap, REQUIRED_MESSAGE};
use crate::session::{Clock, EvaluationSession};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_optional_request, read_request, write_error, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Forms file name inside the data directory (optional, default "forms.json")
    #[serde(default = "default_forms_file")]
    pub forms_file: String,

    /// Id strategy for new forms and fields (optional, default "timestamp")
    #[serde(default)]
    pub id_strategy: IdStrategy,

    /// Lowest log severity written to stderr (optional, default "INFO")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_forms_file() -> String {
    "forms.json".to_string()
}
fn default_log_level() -> String {
    "INFO".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.forms_file.trim().is_empty() {
            return Err(CliError::config_error("forms_file must not be empty"));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(e))
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// Full path of the forms file
    pub fn forms_path(&self) -> PathBuf {
        self.data_path().join(&self.forms_file)
    }

    /// File-backed store over the forms file
    pub fn store(&self) -> FileFormStore {
        FileFormStore::new(self.forms_path())
    }

    /// Id generator with the configured strategy
    pub fn id_generator(&self) -> IdGenerator {
        IdGenerator::new(self.id_strategy)
    }
}

/// Parse arguments and run the selected command
///
/// Errors are reported as a `{"status":"error"}` response before being
/// returned to the caller.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(ref e) = result {
        log_event_with_fields(
            Event::CommandFailed,
            &[("code", e.code_str()), ("message", e.message())],
        );
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::List { config } => list(&config),
        Command::Show { config, form } => show(&config, &form),
        Command::Save { config } => save(&config),
        Command::Preview { config, form } => preview(&config, &form),
        Command::Submit { config, form } => submit(&config, &form),
    }
}

/// Create the data directory and an empty forms file
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let forms_path = config.forms_path();

    if forms_path.exists() {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(config.data_path()).map_err(|e| {
        CliError::config_error(format!(
            "Failed to create directory {:?}: {}",
            config.data_path(),
            e
        ))
    })?;
    config.store().save_forms(&[])?;

    write_response(json!({
        "initialized": true,
        "formsFile": forms_path.display().to_string(),
    }))
}

/// List saved forms with their field counts
pub fn list(config_path: &Path) -> CliResult<()> {
    let (_, store) = open(config_path)?;
    write_response(summarize(&store.load_forms()))
}

/// Print one saved form
pub fn show(config_path: &Path, form_id: &str) -> CliResult<()> {
    let (_, store) = open(config_path)?;
    let form = find(&store, form_id)?;
    write_response(serde_json::to_value(&form)?)
}

/// Save a new form: stdin `{name, fields}`
pub fn save(config_path: &Path) -> CliResult<()> {
    let (config, store) = open(config_path)?;
    let request = read_request()?;
    let form = save_form(&store, &config.id_generator(), request)?;
    write_response(serde_json::to_value(&form)?)
}

/// Preview a saved form: stdin `{values}` (optional)
pub fn preview(config_path: &Path, form_id: &str) -> CliResult<()> {
    let (_, store) = open(config_path)?;
    let form = find(&store, form_id)?;
    let request = read_optional_request()?.unwrap_or(Value::Null);
    write_response(preview_form(&form, request, Clock::System)?)
}

/// Submit values against a saved form: stdin `{values}`
pub fn submit(config_path: &Path, form_id: &str) -> CliResult<()> {
    let (_, store) = open(config_path)?;
    let form = find(&store, form_id)?;
    let request = read_optional_request()?.unwrap_or(Value::Null);
    write_response(submit_form(&form, request, Clock::System)?)
}

/// Builds a form from a save request and appends it to the store.
///
/// Fields without an id get one from `ids`. The form goes through the same
/// checks as the editor: labels, unique ids, non-empty name, valid structure.
pub fn save_form(store: &dyn FormStore, ids: &IdGenerator, request: Value) -> CliResult<FormSchema> {
    let request: SaveRequest = serde_json::from_value(request)?;

    let mut draft = FormDraft::new();
    for raw in request.fields {
        draft.add_field(field_from_request(raw, ids)?)?;
    }

    let form = draft.save(&request.name, ids, Utc::now())?;
    store.add_form(form.clone())?;

    let count = form.fields.len().to_string();
    log_event_with_fields(
        Event::FormSaved,
        &[("field_count", count.as_str()), ("form_id", form.id.as_str())],
    );
    Ok(form)
}

/// Applies values, blurs every field and reports the session state.
pub fn preview_form(form: &FormSchema, request: Value, clock: Clock) -> CliResult<Value> {
    let mut session = session_with_values(form, request, clock)?;
    for field in &form.fields {
        session.blur(&field.id)?;
    }

    Ok(json!({
        "values": session.values(),
        "derived": session.derived_values(),
        "errors": session.errors(),
    }))
}

/// Applies values and runs a submission. Nothing is persisted.
pub fn submit_form(form: &FormSchema, request: Value, clock: Clock) -> CliResult<Value> {
    let mut session = session_with_values(form, request, clock)?;
    let outcome = session.submit();

    Ok(json!({
        "accepted": outcome.is_accepted(),
        "errors": outcome.errors(),
        "derived": session.derived_values(),
    }))
}

/// Body of `save`
#[derive(Debug, Deserialize)]
struct SaveRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: Vec<Value>,
}

/// Body of `preview` and `submit`
#[derive(Debug, Default, Deserialize)]
struct ValuesRequest {
    #[serde(default)]
    values: ValueMap,
}

/// Parses one request field, filling a missing id and pairing the
/// `required` flag with a single leading required rule.
///
/// Either the flag or a required rule marks the field required. An existing
/// required rule keeps its message.
fn field_from_request(mut raw: Value, ids: &IdGenerator) -> CliResult<FieldConfig> {
    let obj = raw
        .as_object_mut()
        .ok_or_else(|| CliError::invalid_input("Each field must be a JSON object"))?;

    let has_id = obj
        .get("id")
        .and_then(Value::as_str)
        .map_or(false, |id| !id.is_empty());
    if !has_id {
        obj.insert("id".to_string(), Value::String(ids.next_id()));
    }

    let field: FieldConfig = serde_json::from_value(raw)?;
    let required_rule = field
        .validations
        .iter()
        .find(|r| r.kind == RuleKind::Required);
    let required = field.required || required_rule.is_some();
    let message = required_rule
        .map(|r| r.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| REQUIRED_MESSAGE.to_string());

    Ok(field.with_required_message(required, message))
}

fn session_with_values(
    form: &FormSchema,
    request: Value,
    clock: Clock,
) -> CliResult<EvaluationSession<'_>> {
    let request: ValuesRequest = if request.is_null() {
        ValuesRequest::default()
    } else {
        serde_json::from_value(request)?
    };

    let mut session = EvaluationSession::with_clock(form, clock);
    for (field_id, value) in request.values {
        session.set_value(&field_id, value)?;
    }
    Ok(session)
}

fn summarize(forms: &[FormSchema]) -> Value {
    Value::Array(
        forms
            .iter()
            .map(|form| {
                json!({
                    "id": form.id,
                    "name": form.name,
                    "createdAt": form.created_at,
                    "fieldCount": form.fields.len(),
                })
            })
            .collect(),
    )
}

fn find(store: &dyn FormStore, form_id: &str) -> CliResult<FormSchema> {
    store
        .find_form(form_id)
        .ok_or_else(|| CliError::form_not_found(form_id))
}

/// Loads the config and applies its log level
fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("data_dir", config.data_dir.as_str()),
            ("id_strategy", config.id_strategy.as_str()),
        ],
    );
    Ok(config)
}

/// Loads the config and opens an initialized forms file
fn open(config_path: &Path) -> CliResult<(Config, FileFormStore)> {
    let config = load_config(config_path)?;
    if !config.forms_path().exists() {
        return Err(CliError::not_initialized());
    }
    let store = config.store();
    Ok((config, store))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use crate::persistence::MemoryFormStore;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn create_config(temp_dir: &TempDir) -> PathBuf {
        let config_path = temp_dir.path().join("formwright.json");
        let data_dir = temp_dir.path().join("data");

        let config = json!({
            "data_dir": data_dir.to_string_lossy()
        });

        fs::write(&config_path, config.to_string()).unwrap();
        config_path
    }

    fn signup_request() -> Value {
        json!({
            "name": "  Signup  ",
            "fields": [
                {"id": "1", "type": "text", "label": "Name", "required": true,
                 "validations": [{"type": "required", "message": "Name needed"}]},
                {"id": "2", "type": "date", "label": "Birth date"},
                {"id": "3", "type": "number", "label": "Age", "isDerived": true,
                 "parentFields": ["2"], "derivationLogic": "ageFromDOB"}
            ]
        })
    }

    fn fixed_clock() -> Clock {
        Clock::Fixed(Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_init_creates_forms_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        init(&config_path).unwrap();

        let forms_path = temp_dir.path().join("data").join("forms.json");
        assert!(forms_path.exists());
        assert!(FileFormStore::new(forms_path).load_forms().is_empty());
    }

    #[test]
    fn test_init_refuses_reinit() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        init(&config_path).unwrap();

        let result = init(&config_path);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().code(),
            &CliErrorCode::AlreadyInitialized
        );
    }

    #[test]
    fn test_list_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        let result = list(&config_path);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::NotInitialized);
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_config(&temp_dir);

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.forms_file, "forms.json");
        assert_eq!(config.id_strategy, IdStrategy::Timestamp);
        assert_eq!(config.severity().unwrap(), Severity::Info);
        assert_eq!(config.forms_path(), temp_dir.path().join("data").join("forms.json"));
    }

    #[test]
    fn test_config_rejects_unknown_log_level() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("formwright.json");

        let config = json!({
            "data_dir": temp_dir.path().join("data").to_string_lossy(),
            "log_level": "chatty"
        });
        fs::write(&config_path, config.to_string()).unwrap();

        let result = Config::load(&config_path);
        assert_eq!(result.unwrap_err().code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_config_reads_uuid_strategy() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("formwright.json");

        let config = json!({
            "data_dir": temp_dir.path().join("data").to_string_lossy(),
            "id_strategy": "uuid"
        });
        fs::write(&config_path, config.to_string()).unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.id_strategy, IdStrategy::Uuid);
    }

    #[test]
    fn test_save_form_appends_to_store() {
        let store = MemoryFormStore::new();
        let ids = IdGenerator::default();

        let form = save_form(&store, &ids, signup_request()).unwrap();
        assert_eq!(form.name, "Signup");
        assert_eq!(form.fields.len(), 3);
        assert_eq!(store.find_form(&form.id), Some(form));
    }

    #[test]
    fn test_save_form_assigns_missing_field_ids() {
        let store = MemoryFormStore::new();
        let ids = IdGenerator::default();

        let request = json!({
            "name": "Contact",
            "fields": [
                {"type": "text", "label": "Email"},
                {"id": "", "type": "text", "label": "Note"}
            ]
        });
        let form = save_form(&store, &ids, request).unwrap();
        assert!(!form.fields[0].id.is_empty());
        assert_ne!(form.fields[0].id, form.fields[1].id);
    }

    #[test]
    fn test_save_form_pairs_required_flag_with_rule() {
        let store = MemoryFormStore::new();
        let ids = IdGenerator::default();

        let request = json!({
            "name": "Contact",
            "fields": [
                {"id": "a", "type": "text", "label": "Name", "required": true},
                {"id": "b", "type": "text", "label": "Email",
                 "validations": [
                     {"type": "email", "message": "Bad email"},
                     {"type": "required", "message": "Email needed"}
                 ]}
            ]
        });
        let form = save_form(&store, &ids, request).unwrap();

        let name = &form.fields[0];
        assert!(name.required);
        assert_eq!(name.validations.len(), 1);
        assert_eq!(name.validations[0].kind, RuleKind::Required);
        assert_eq!(name.validations[0].message, REQUIRED_MESSAGE);

        let email = &form.fields[1];
        assert!(email.required);
        let kinds: Vec<&RuleKind> = email.validations.iter().map(|r| &r.kind).collect();
        assert_eq!(kinds, [&RuleKind::Required, &RuleKind::Email]);
        assert_eq!(email.validations[0].message, "Email needed");

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_save_form_keeps_unreadable_store_intact() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("forms.json");
        let raw = r#"[{"id":"1","name":"Old","createdAt":"2024-01-01T00:00:00Z",
            "fields":[{"id":"a","type":"text","label":"A",
            "validations":[{"type":"maxLength","value":-1,"message":"x"}]}]}]"#;
        fs::write(&path, raw).unwrap();

        let store = FileFormStore::new(&path);
        let err = save_form(&store, &IdGenerator::default(), signup_request()).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::StoreFailed);
        assert_eq!(fs::read_to_string(&path).unwrap(), raw);
    }

    #[test]
    fn test_save_form_rejects_bad_forms() {
        let store = MemoryFormStore::new();
        let ids = IdGenerator::default();

        let no_name = json!({"name": " ", "fields": [{"type": "text", "label": "A"}]});
        let err = save_form(&store, &ids, no_name).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidForm);

        let no_fields = json!({"name": "Empty"});
        let err = save_form(&store, &ids, no_fields).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidForm);

        let orphan = json!({
            "name": "Orphan",
            "fields": [{"id": "a", "type": "number", "label": "Age",
                        "isDerived": true, "parentFields": ["zz"],
                        "derivationLogic": "ageFromDOB"}]
        });
        let err = save_form(&store, &ids, orphan).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidForm);

        assert!(store.is_empty());
    }

    #[test]
    fn test_preview_reports_values_derived_and_errors() {
        let store = MemoryFormStore::new();
        let form = save_form(&store, &IdGenerator::default(), signup_request()).unwrap();

        let data = preview_form(&form, json!({"values": {"2": "1990-01-01"}}), fixed_clock()).unwrap();
        assert_eq!(data["values"]["2"], "1990-01-01");
        assert_eq!(data["derived"]["3"], 34);
        assert_eq!(data["errors"]["1"], "Name needed");
        assert!(data["errors"].get("3").is_none());
    }

    #[test]
    fn test_preview_without_values() {
        let store = MemoryFormStore::new();
        let form = save_form(&store, &IdGenerator::default(), signup_request()).unwrap();

        let data = preview_form(&form, Value::Null, fixed_clock()).unwrap();
        assert_eq!(data["values"]["1"], "");
        assert_eq!(data["derived"]["3"], "");
    }

    #[test]
    fn test_submit_accepts_and_rejects() {
        let store = MemoryFormStore::new();
        let form = save_form(&store, &IdGenerator::default(), signup_request()).unwrap();

        let rejected = submit_form(&form, json!({"values": {}}), fixed_clock()).unwrap();
        assert_eq!(rejected["accepted"], false);
        assert_eq!(rejected["errors"][0]["fieldId"], "1");
        assert_eq!(rejected["errors"][0]["message"], "Name needed");

        let accepted = submit_form(
            &form,
            json!({"values": {"1": "Ada", "2": "2000-03-01"}}),
            fixed_clock(),
        )
        .unwrap();
        assert_eq!(accepted["accepted"], true);
        assert_eq!(accepted["errors"], json!([]));
        assert_eq!(accepted["derived"]["3"], 24);
    }

    #[test]
    fn test_values_for_derived_field_rejected() {
        let store = MemoryFormStore::new();
        let form = save_form(&store, &IdGenerator::default(), signup_request()).unwrap();

        let err = submit_form(&form, json!({"values": {"3": 99}}), fixed_clock()).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidInput);
    }

    #[test]
    fn test_summarize() {
        let form = FormSchema::new(
            "9",
            "Survey",
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            vec![FieldConfig::new("1", crate::schema::FieldType::Text, "Q1")],
        );
        let summary = summarize(&[form]);
        assert_eq!(summary[0]["id"], "9");
        assert_eq!(summary[0]["fieldCount"], 1);
        assert_eq!(summary[0]["createdAt"], "2024-01-02T03:04:05Z");
    }
}
