pub mod mapping;
pub mod progress;
pub mod request;
pub mod response;
pub mod validation;

pub use mapping::{ColumnMapping, MappingEntry};
pub use progress::{ConfigDialog, DialogState, ImportStatus, SyncPhase};
pub use request::{SelectSheetRequest, SetMappingRequest, ToggleAutoSyncRequest};
pub use response::{
    ConnectResponse, ImportOutcomeKind, ImportResponse, MappingResponse, SheetColumnsResponse,
    SheetSelections, SyncSnapshot,
};
pub use validation::{DatasetImportReport, ImportReport, ValidationResult, ValidationStatus};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportFromGoogleSheets;

impl UseCaseMetadata for ImportFromGoogleSheets {
    fn usecase_index() -> &'static str {
        "u601"
    }

    fn usecase_name() -> &'static str {
        "import_from_google_sheets"
    }

    fn display_name() -> &'static str {
        "Import from Google Sheets"
    }

    fn description() -> &'static str {
        "Loads financial months and portfolio companies from mapped spreadsheet columns"
    }
}
