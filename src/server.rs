use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use ntex::web;
use ntex_files::NamedFile;
use ramhorns::Template;
use spdlog::{error, info};

use crate::config::Config;
use crate::endpoint::{publish_blog, AppState};
use crate::publish::{Publisher, SiteTarget};
use crate::store::github::GithubStore;
use crate::submission::Passkey;

const FORM_FILE_NAME: &str = "index.html";

/// What the submission form pages need
pub struct FormState {
    pub public_dir: Option<PathBuf>,
    pub publish_path: String,
}

#[derive(ramhorns::Content)]
struct FormView<'a> {
    publish_path: &'a str,
}

impl FormState {
    pub fn new(config: &Config) -> Self {
        Self {
            public_dir: config.paths.public_dir.clone(),
            publish_path: config.server.publish_path.clone(),
        }
    }

    fn public_dir(&self) -> Result<&PathBuf, web::Error> {
        self.public_dir.as_ref()
            .ok_or_else(|| web::error::ErrorNotFound("No submission form configured").into())
    }

    /// The form page, pointed at the configured publish path
    fn render_form(&self) -> Result<String, web::Error> {
        let source = std::fs::read_to_string(self.public_dir()?.join(FORM_FILE_NAME))?;
        let template = Template::new(source).map_err(|e| {
            error!("Error parsing submission form: {}", e);
            web::error::ErrorInternalServerError("Invalid submission form")
        })?;
        Ok(template.render(&FormView { publish_path: &self.publish_path }))
    }
}

#[web::get("/")]
async fn index(state: web::types::State<Arc<FormState>>) -> Result<web::HttpResponse, web::Error> {
    let page = state.render_form()?;
    Ok(web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page))
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<FormState>>) -> Result<NamedFile, web::Error> {
    if path.contains("..") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    Ok(NamedFile::open(state.public_dir()?.join(path.into_inner()))?)
}

/// Builds the shared state: the GitHub backed publisher and the passkey
pub fn build_state(config: &Config) -> io::Result<AppState> {
    let token = config.github.token()?;
    let store = GithubStore::new(&config.github, &token)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let site = SiteTarget {
        owner: config.github.owner.clone(),
        pages_domain: config.github.pages_domain.clone(),
    };
    let publisher = Publisher::new(Arc::new(store), site);
    let passkey = Passkey::new(config.passkey()?);

    Ok(AppState::new(publisher, passkey))
}

pub async fn server_run(config: Config, state: AppState) -> io::Result<()> {
    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let publish_path = config.server.publish_path.clone();
    let max_body_bytes = config.server.max_body_bytes;

    info!("Publishing to {}/{} through {}", config.github.owner, config.github.repo, publish_path);
    let form_state = Arc::new(FormState::new(&config));
    match form_state.public_dir {
        Some(ref dir) => info!("Serving submission form from {}", dir.display()),
        None => info!("No public_dir configured. Submission form disabled"),
    }

    let app_state = Arc::new(state);

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .state(form_state.clone())
            .state(web::types::PayloadConfig::new(max_body_bytes))
            .service(index)
            .service(public_files)
            .service(web::resource(publish_path.as_str()).to(publish_blog))
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
