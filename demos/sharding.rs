//! Walk a bucket set through a scale-down and show which keys move.

use bucketset::{BucketSet, NamespacedName};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("bucketset=debug,info")
        .init();

    let replicas = ["controller-0", "controller-1", "controller-2"];
    let set = BucketSet::new(replicas);

    let keys: Vec<NamespacedName> = (0..12)
        .map(|i| NamespacedName::new("default", format!("service-{}", i)))
        .collect();

    println!("--- {} replicas ---", set.len());
    let before: Vec<String> = keys
        .iter()
        .map(|key| set.owner(&key.to_string()).unwrap_or_default())
        .collect();
    for (key, owner) in keys.iter().zip(&before) {
        println!("  {:<20} -> {}", key.to_string(), owner);
    }

    for bucket in set.buckets() {
        let owned = keys.iter().filter(|key| bucket.has(key)).count();
        println!("  {} owns {} keys", bucket.name(), owned);
    }

    // controller-2 is scaled away
    set.update(replicas[..2].iter().copied());

    println!("\n--- {} replicas ---", set.len());
    for (key, old) in keys.iter().zip(&before) {
        let new = set.owner(&key.to_string()).unwrap_or_default();
        let marker = if &new != old { " (moved)" } else { "" };
        println!("  {:<20} -> {}{}", key.to_string(), new, marker);
    }

    let stats = set.stats();
    println!("\nBucket set stats:");
    println!("  Buckets: {}", stats.buckets);
    println!("  Cached entries: {}", stats.cached_entries);
    println!("  Hits: {}", stats.hits);
    println!("  Misses: {}", stats.misses);
    println!("  Purges: {}", stats.purges);

    Ok(())
}
