//! Example consumer: serves an admin for authors and their books.
//!
//! Run from repo root: `ADMIN_USERNAME=admin ADMIN_PASSWORD=secret cargo run -p example-consumer`
//! then open http://127.0.0.1:3000/admin/

use autoadmin::{
    admin_routes, status_routes, connect, ensure_tables, init_tracing, AdminBuilder,
    AdminModel, AdminSettings, AppState, FieldDescriptor, FileField,
};
use tokio::net::TcpListener;

struct Author;

impl AdminModel for Author {
    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::of::<i64>("Id"),
            FieldDescriptor::of::<String>("Name").tag("list,search,width=6"),
            FieldDescriptor::of::<String>("Email").tag("list,search,width=6"),
            FieldDescriptor::of::<String>("Photo").tag("field=file,upload_dir=media"),
        ]
    }
}

struct Book;

impl AdminModel for Book {
    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::of::<i64>("Id"),
            FieldDescriptor::of::<String>("Title").tag("list,search"),
            FieldDescriptor::foreign_key::<Author>("Author").tag("list,width=6"),
            FieldDescriptor::of::<i32>("Pages").tag("list,width=3,default=100"),
            FieldDescriptor::of::<bool>("InPrint").tag("label=In print,width=3"),
            FieldDescriptor::of::<chrono::NaiveDateTime>("Published").tag("width=6"),
            FieldDescriptor::of::<String>("Notes").tag("-"),
        ]
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = AdminSettings::from_dotenv()?;
    init_tracing("autoadmin=info,example_consumer=info");

    let mut builder = AdminBuilder::new().name_transform(settings.name_transform.clone());
    builder.custom_field("file", || Box::new(FileField::new("media")));
    let library = builder.group("Library");
    // Book first: its Author key stays pending until Author is registered.
    builder.register::<Book>(library)?;
    builder.register::<Author>(library)?;
    let registry = builder.build()?;

    let pool = connect(&settings.database_url).await?;
    ensure_tables(&pool, &registry).await?;

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
    let state = AppState::new(pool, registry, settings);
    let admin_url = state.settings.index_url();
    let app = admin_routes(state.clone()).merge(status_routes(state));

    let listener = TcpListener::bind(&bind).await?;
    tracing::info!("admin listening on http://{}{}", listener.local_addr()?, admin_url);
    axum::serve(listener, app).await?;
    Ok(())
}
