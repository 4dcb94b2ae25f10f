use utoipa::OpenApi;

use crate::core::error::FieldError;
use crate::features::auth::handlers as auth_handlers;
use crate::features::files::dtos as files_dtos;
use crate::features::files::handlers as files_handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::google_login,
        auth_handlers::google_callback,
        // Files
        files_handlers::create_text,
        files_handlers::list_all,
        files_handlers::count_all,
        files_handlers::search_files,
    ),
    components(schemas(
        files_dtos::CreateTextDto,
        files_dtos::FileRecordDto,
        files_dtos::UploadResponseDto,
        files_dtos::FileListResponseDto,
        files_dtos::FileCountResponseDto,
        FieldError,
    )),
    tags(
        (name = "auth", description = "Google sign-in flow"),
        (name = "files", description = "Text upload and query endpoints")
    )
)]
pub struct ApiDoc;
