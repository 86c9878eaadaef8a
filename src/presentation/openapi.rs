use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::auth::login,
        crate::presentation::http::auth::register,
        crate::presentation::http::auth::logout,
        crate::presentation::http::auth::update_credentials,
        crate::presentation::http::users::list_users,
        crate::presentation::http::users::me,
        crate::presentation::http::users::get_user,
        crate::presentation::http::admins::list_admins,
        crate::presentation::http::admins::me,
        crate::presentation::http::admins::create_admin,
        crate::presentation::http::patterns::list_patterns,
        crate::presentation::http::configs::list_configs,
        crate::presentation::http::configs::get_active_config,
        crate::presentation::http::configs::get_active_full_config,
        crate::presentation::http::configs::update_active_config,
        crate::presentation::http::configs::get_config,
        crate::presentation::http::configs::delete_config,
        crate::presentation::http::configs::activate_config,
        crate::presentation::http::configs::clone_config,
        crate::presentation::http::forms::submit_answers,
        crate::presentation::http::attempts::check_active,
        crate::presentation::http::attempts::begin,
        crate::presentation::http::attempts::continue_attempt,
        crate::presentation::http::attempts::discard,
        crate::presentation::http::attempts::end,
        crate::presentation::http::event_logs::save_question_event,
        crate::presentation::http::event_logs::save_option_event,
        crate::presentation::http::event_logs::list_event_logs,
        crate::presentation::http::event_logs::list_user_event_logs,
        crate::presentation::ws::option_event_socket,
        crate::presentation::http::summaries::all_summaries,
        crate::presentation::http::summaries::my_summary,
        crate::presentation::http::results::export_all,
        crate::presentation::http::results::export_forms,
        crate::presentation::http::results::export_tests,
        crate::presentation::http::results::user_results,
        crate::presentation::http::results::user_form_results,
        crate::presentation::http::results::user_test_results,
        crate::presentation::http::results::user_results_csv,
        crate::presentation::http::results::user_form_results_csv,
        crate::presentation::http::results::user_test_results_csv,
        crate::presentation::http::health::health,
    ),
    components(schemas(
        crate::application::dto::users::User,
        crate::application::dto::users::Admin,
        crate::application::dto::users::NewUser,
        crate::application::dto::users::NewAdmin,
        crate::application::dto::users::Credentials,
        crate::application::dto::users::CredentialsUpdate,
        crate::application::dto::users::Token,
        crate::application::dto::configs::Pattern,
        crate::application::dto::configs::PatternUpdate,
        crate::application::dto::configs::InformationCard,
        crate::application::dto::configs::InformationCardUpdate,
        crate::application::dto::configs::FrequentlyAskedQuestion,
        crate::application::dto::configs::FrequentlyAskedQuestionUpdate,
        crate::application::dto::configs::Translation,
        crate::application::dto::configs::TranslationUpdate,
        crate::application::dto::configs::ConfigPreview,
        crate::application::dto::configs::TrimmedConfig,
        crate::application::dto::configs::FullConfig,
        crate::application::dto::configs::ConfigUpdate,
        crate::application::dto::configs::ClonedConfig,
        crate::application::dto::images::Image,
        crate::application::dto::forms::Form,
        crate::application::dto::forms::FormQuestion,
        crate::application::dto::forms::SelectOneQuestion,
        crate::application::dto::forms::SelectMultipleQuestion,
        crate::application::dto::forms::SliderQuestion,
        crate::application::dto::forms::TextQuestion,
        crate::application::dto::forms::FormOption,
        crate::application::dto::forms::SliderLabel,
        crate::application::dto::forms::FormUpdate,
        crate::application::dto::forms::FormQuestionUpdate,
        crate::application::dto::forms::SelectOneUpdate,
        crate::application::dto::forms::SelectMultipleUpdate,
        crate::application::dto::forms::SliderUpdate,
        crate::application::dto::forms::TextUpdate,
        crate::application::dto::forms::FormOptionUpdate,
        crate::application::dto::forms::SliderLabelUpdate,
        crate::application::dto::forms::NewFormAnswers,
        crate::application::dto::forms::NewFormAnswer,
        crate::application::dto::forms::FormAnswer,
        crate::application::dto::test_groups::TestGroup,
        crate::application::dto::test_groups::TestPhase,
        crate::application::dto::test_groups::TestQuestion,
        crate::application::dto::test_groups::TestOption,
        crate::application::dto::test_groups::AssignedTestGroup,
        crate::application::dto::test_groups::AssignedTestPhase,
        crate::application::dto::test_groups::AssignedTestQuestion,
        crate::application::dto::test_groups::AssignedTestOption,
        crate::application::dto::test_groups::TestGroupUpdate,
        crate::application::dto::test_groups::TestPhaseUpdate,
        crate::application::dto::test_groups::TestQuestionUpdate,
        crate::application::dto::test_groups::TestOptionUpdate,
        crate::application::dto::attempts::UserTestAttempt,
        crate::application::dto::attempts::UserTestAttemptAnswer,
        crate::application::dto::attempts::TestAttemptSummary,
        crate::application::dto::attempts::TestAttemptsSummary,
        crate::application::dto::events::NewQuestionEventLog,
        crate::application::dto::events::NewOptionEventLog,
        crate::application::dto::events::QuestionTimestamp,
        crate::application::dto::events::OptionEventLog,
        crate::application::dto::events::OptionSelectionEvent,
        crate::application::dto::events::QuestionEventLog,
        crate::application::dto::events::QuestionEventLogWithUserId,
        crate::application::dto::results::FormSubmission,
        crate::application::dto::results::TestResult,
        crate::application::dto::results::ResultsByConfig,
        crate::application::dto::results::ResultsByUser,
        crate::application::dto::results::FormSubmissionsByConfig,
        crate::application::dto::results::FormSubmissionsByUser,
        crate::application::dto::results::TestResultsByConfig,
        crate::application::dto::results::TestResultsByUser,
        crate::application::errors::FieldError,
        crate::domain::users::user::Role,
        crate::domain::forms::form::FormType,
        crate::domain::forms::form::FormQuestionType,
        crate::domain::events::option_event::OptionEventType,
        crate::presentation::http::error::ApiHttpError,
        crate::presentation::http::configs::ConfigUpdateMultipart,
        crate::presentation::http::health::HealthResp,
    )),
    tags(
        (name = "Auth", description = "Sign in, registration and credentials"),
        (name = "Users", description = "Participants"),
        (name = "Admins", description = "Administrator accounts"),
        (name = "Patterns", description = "Username patterns"),
        (name = "Configs", description = "Versioned test configurations"),
        (name = "Forms", description = "Pre- and post-test form answers"),
        (name = "Test", description = "Participant test attempts"),
        (name = "Event logs", description = "Question and option interaction logs"),
        (name = "Summaries", description = "Per-attempt accuracy and timing"),
        (name = "Results", description = "Result exports"),
        (name = "Health", description = "System health checks")
    )
)]
pub struct ApiDoc;
