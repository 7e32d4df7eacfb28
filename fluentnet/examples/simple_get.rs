//! Simple HTTP GET request example.
//!
//! Sends one request through the process-wide context and prints every hop.

use fluentnet::URLRequest;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Sending request to httpbin.org...");
    let call = URLRequest::new("http://httpbin.org/redirect/2")
        .header("Accept", "application/json")
        .send()
        .await?;

    for url in call.redirect_chain() {
        println!("  visited {}", url);
    }

    if let Some(response) = &call.response {
        println!("Status: {}", response.status());
        println!("Headers:");
        for (name, value) in response.headers() {
            println!("  {}: {:?}", name, value);
        }
    }
    println!("Took {:?}", call.duration());

    Ok(())
}
