//! The status command: show the metadata record and row counts.

use gleaner::{db, store};

pub(crate) async fn handle_status(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match store::get_metadata(&db).await? {
        Some(meta) => {
            println!("Last refresh: {}", meta.last_refresh);
            println!("Status:       {}", meta.status);
            match meta.error {
                Some(error) => println!("Error detail: {}", error),
                None => println!("Error detail: none"),
            }
        }
        None => {
            println!("No metadata row found. Has `gleaner migrate up` been run?");
        }
    }

    let repositories = store::count_repositories(&db).await?;
    let issues = store::count_issues(&db).await?;
    let displayable = store::count_open_good_first_issues(&db).await?;
    println!();
    println!("Repositories: {}", repositories);
    println!("Issues:       {} ({} open good-first)", issues, displayable);

    db.close().await?;
    Ok(())
}
