//! Declared fields, types and bounds of `config.toml`.

use toml::{Table, Value};

use super::types::{FontStyle, HistoryOrdering, LogLevel, TabCloseBehavior};
use crate::constants::*;
use crate::profile::profile_name_problem;
use crate::schema::{check_table, join, sub_table, Field, Kind, Violation};

const GENERAL: &[Field] = &[
    Field::optional("theme", Kind::NonEmptyStr),
    Field::optional("home_page", Kind::Str),
    Field::optional("default_profile", Kind::NonEmptyStr),
    Field::optional("show_splash_screen", Kind::Bool),
    Field::optional("force_new_window", Kind::Bool),
    Field::optional("profile_directory", Kind::NonEmptyStr),
];

const WINDOW: &[Field] = &[
    Field::optional(
        "width",
        Kind::Int {
            min: WINDOW_WIDTH_MIN,
            max: WINDOW_WIDTH_MAX,
        },
    ),
    Field::optional(
        "height",
        Kind::Int {
            min: WINDOW_HEIGHT_MIN,
            max: WINDOW_HEIGHT_MAX,
        },
    ),
    Field::optional(
        "x",
        Kind::Int {
            min: -WINDOW_WIDTH_MAX,
            max: WINDOW_WIDTH_MAX,
        },
    ),
    Field::optional(
        "y",
        Kind::Int {
            min: -WINDOW_HEIGHT_MAX,
            max: WINDOW_HEIGHT_MAX,
        },
    ),
];

const BROWSER: &[Field] = &[
    Field::optional("javascript_enabled", Kind::Bool),
    Field::optional("local_storage_enabled", Kind::Bool),
    Field::optional("plugins_enabled", Kind::Bool),
    Field::optional("webrtc_enabled", Kind::Bool),
    Field::optional("camera_enabled", Kind::Bool),
    Field::optional("microphone_enabled", Kind::Bool),
    Field::optional("screen_capture_enabled", Kind::Bool),
    Field::optional("tab_close_behavior", Kind::Choice(TabCloseBehavior::NAMES)),
    Field::optional("show_tab_favicons", Kind::Bool),
];

const UI: &[Field] = &[
    Field::optional(
        "scale_factor",
        Kind::Float {
            min: SCALE_FACTOR_MIN,
            max: SCALE_FACTOR_MAX,
        },
    ),
    Field::optional(
        "font_size_adjustment",
        Kind::Int {
            min: FONT_SIZE_ADJUSTMENT_MIN,
            max: FONT_SIZE_ADJUSTMENT_MAX,
        },
    ),
    Field::optional("font_family", Kind::NonEmptyStr),
    Field::optional("font_weight", Kind::NonEmptyStr),
    Field::optional("font_style", Kind::Choice(FontStyle::NAMES)),
    Field::optional(
        "force_dpi",
        Kind::Int {
            min: 0,
            max: FORCE_DPI_MAX,
        },
    ),
    Field::optional("enable_high_dpi_scaling", Kind::Bool),
];

const WAYLAND: &[Field] = &[
    Field::optional("disable_window_decoration", Kind::Bool),
    Field::optional("auto_screen_scale_factor", Kind::Bool),
    Field::optional("disable_gpu_sandbox", Kind::Bool),
    Field::optional("disable_software_rasterizer", Kind::Bool),
    Field::optional("enable_vaapi_video_decoder", Kind::Bool),
    Field::optional("disable_sandbox", Kind::Bool),
    Field::optional("disable_hardware_acceleration", Kind::Bool),
];

const SEARCH_ENGINE: &[Field] = &[
    Field::required("name", Kind::NonEmptyStr),
    Field::required("url", Kind::NonEmptyStr),
    Field::optional("shortcut", Kind::Str),
    Field::optional("default", Kind::Bool),
];

const PROFILE: &[Field] = &[
    Field::optional("theme", Kind::NonEmptyStr),
    Field::optional("title_suffix", Kind::Str),
    Field::optional("home_page", Kind::Str),
    Field::optional("webrtc_enabled", Kind::Bool),
    Field::optional("camera_enabled", Kind::Bool),
    Field::optional("microphone_enabled", Kind::Bool),
    Field::optional("screen_capture_enabled", Kind::Bool),
];

const KEEPASSXC: &[Field] = &[
    Field::optional("enabled", Kind::Bool),
    Field::optional("database_path", Kind::Str),
    Field::optional("key_file", Kind::Str),
    Field::optional("auto_search", Kind::Bool),
    Field::optional("show_context_menu", Kind::Bool),
    Field::optional(
        "clip_timeout",
        Kind::Int {
            min: 0,
            max: CLIP_TIMEOUT_MAX,
        },
    ),
];

const HISTORY: &[Field] = &[
    Field::optional("enabled", Kind::Bool),
    Field::optional(
        "retention_days",
        Kind::Int {
            min: 0,
            max: HISTORY_RETENTION_DAYS_MAX,
        },
    ),
    Field::optional(
        "max_entries",
        Kind::Int {
            min: 0,
            max: HISTORY_MAX_ENTRIES_MAX,
        },
    ),
    Field::optional(
        "autocomplete_max_results",
        Kind::Int {
            min: 1,
            max: HISTORY_AUTOCOMPLETE_MAX,
        },
    ),
    Field::optional(
        "cleanup_interval_minutes",
        Kind::Int {
            min: 1,
            max: HISTORY_CLEANUP_MINUTES_MAX,
        },
    ),
    Field::optional("ordering", Kind::Choice(HistoryOrdering::NAMES)),
];

const LOGGING: &[Field] = &[Field::optional("level", Kind::Choice(LogLevel::NAMES))];

/// Flat sections checked field by field.
const SECTIONS: &[(&str, &[Field])] = &[
    ("general", GENERAL),
    ("window", WINDOW),
    ("browser", BROWSER),
    ("ui", UI),
    ("wayland", WAYLAND),
    ("keepassxc", KEEPASSXC),
    ("history", HISTORY),
    ("logging", LOGGING),
];

/// Validates a parsed document against the schema.
pub(super) fn validate(doc: &Table) -> Result<(), Violation> {
    for (name, fields) in SECTIONS {
        if let Some(section) = sub_table(doc, "", name)? {
            check_table(name, section, fields)?;
        }
    }
    let default_profile = sub_table(doc, "", "general")?
        .and_then(|general| general.get("default_profile"))
        .and_then(Value::as_str);
    if let Some(problem) = default_profile.and_then(profile_name_problem) {
        return Err(Violation::new("general.default_profile", problem));
    }
    validate_search(doc)?;
    validate_profiles(doc)?;
    Ok(())
}

fn validate_search(doc: &Table) -> Result<(), Violation> {
    let Some(search) = sub_table(doc, "", "search")? else {
        return Ok(());
    };
    let engines = match search.get("engines") {
        None => return Ok(()),
        Some(Value::Array(engines)) => engines,
        Some(other) => {
            return Err(Violation::new(
                "search.engines",
                format!("expected an array of tables, found {}", other.type_str()),
            ))
        }
    };
    for (i, engine) in engines.iter().enumerate() {
        let prefix = format!("search.engines[{}]", i);
        let Value::Table(engine) = engine else {
            return Err(Violation::new(prefix, "expected a table"));
        };
        check_table(&prefix, engine, SEARCH_ENGINE)?;
        if let Some(url) = engine.get("url").and_then(Value::as_str) {
            if !url.contains(SEARCH_PLACEHOLDER) {
                return Err(Violation::new(
                    join(&prefix, "url"),
                    format!("URL template must contain '{}'", SEARCH_PLACEHOLDER),
                ));
            }
        }
    }
    Ok(())
}

fn validate_profiles(doc: &Table) -> Result<(), Violation> {
    let Some(profiles) = sub_table(doc, "", "profiles")? else {
        return Ok(());
    };
    for name in profiles.keys() {
        let prefix = join("profiles", name);
        if let Some(problem) = profile_name_problem(name) {
            return Err(Violation::new(prefix, problem));
        }
        let Some(profile) = sub_table(profiles, "profiles", name)? else {
            continue;
        };
        check_table(&prefix, profile, PROFILE)?;

        let Some(permissions) = sub_table(profile, &prefix, "permissions")? else {
            continue;
        };
        let perm_prefix = join(&prefix, "permissions");
        for origin in permissions.keys() {
            let Some(features) = sub_table(permissions, &perm_prefix, origin)? else {
                continue;
            };
            for (feature, granted) in features {
                if !granted.is_bool() {
                    return Err(Violation::new(
                        format!("{}.{}.{}", perm_prefix, origin, feature),
                        format!("expected a boolean, found {}", granted.type_str()),
                    ));
                }
            }
        }
    }
    Ok(())
}
