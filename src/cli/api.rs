//! CLI handlers that read from the API.

use crate::api::NoticeQuery;

use super::{build_client, GetArgs, NoticeListArgs};

/// Handle `scholar get <path>`.
pub async fn handle_get(args: &GetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let response = client.get(&args.path).await?;
    match response.json::<serde_json::Value>() {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", response.text()),
    }
    Ok(())
}

/// Handle `scholar notices list`.
pub async fn handle_notice_list(args: &NoticeListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = build_client()?;
    let query = NoticeQuery::builder()
        .maybe_search(args.search.clone())
        .page(args.page)
        .maybe_page_size(args.page_size)
        .build();
    let page = client.notices().list(&query).await?;

    println!("{} notices", page.total);
    for notice in page.items {
        let pin = if notice.is_pinned { "[pinned] " } else { "" };
        println!("  #{} {pin}{}", notice.id, notice.title);
    }
    Ok(())
}
