use fluentnet::cookies::persistence::save_cookies;
use fluentnet::Client;
use std::error::Error;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let client = Client::builder()
        .base_url("http://httpbin.org")
        .cookie_session()
        .build();

    println!("--- Step 1: Setting cookie ---");
    let call = client
        .get("cookies/set?test_cookie=hello_fluentnet")
        .send()
        .await?;
    println!("Step 1 hops: {}", call.hop_count());

    println!("\n--- Step 2: Verifying cookie ---");
    let echoed: Option<serde_json::Value> = client.get("cookies").receive_json().await?;
    println!("Server saw: {:#?}", echoed);

    if let Some(jar) = client.cookie_jar() {
        for cookie in jar.cookies() {
            println!("Stored: {}", cookie.to_set_cookie_string());
        }
        save_cookies(jar, Path::new("cookies.json"))?;
        println!("Saved {} cookies to cookies.json", jar.len());
    }

    Ok(())
}
