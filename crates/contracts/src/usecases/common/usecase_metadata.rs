/// Identification of a UseCase for logs and the API
pub trait UseCaseMetadata {
    /// UseCase index, e.g. "u601"
    fn usecase_index() -> &'static str;

    /// Technical name, e.g. "import_from_google_sheets"
    fn usecase_name() -> &'static str;

    /// Name shown in the UI
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Full name of the form "u601_import_from_google_sheets"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
