use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Irregular closed polygon around a centre point.
fn blob(rng: &mut SimpleRng, lon: f64, lat: f64, radius: f64) -> Value {
    let n = 6 + (rng.next_u64() % 5) as usize;
    let mut ring: Vec<[f64; 2]> = (0..n)
        .map(|i| {
            let angle = i as f64 / n as f64 * std::f64::consts::TAU;
            let r = radius * rng.range(0.6, 1.2);
            [lon + r * angle.cos(), lat + r * angle.sin() * 0.7]
        })
        .collect();
    ring.push(ring[0]);
    json!({ "type": "Polygon", "coordinates": [ring] })
}

fn iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Altitude spelled the way one of the upstream schemas would.
fn put_altitudes(rng: &mut SimpleRng, props: &mut Map<String, Value>, floor: f64, top: f64) {
    match rng.next_u64() % 5 {
        0 => {
            props.insert("min_ft".into(), json!(floor));
            props.insert("max_ft".into(), json!(top));
        }
        1 => {
            props.insert("base".into(), json!(floor));
            props.insert("top".into(), json!(top));
        }
        2 => {
            props.insert("altitudeLow1".into(), json!(floor.to_string()));
            props.insert("altitudeHi1".into(), json!(top.to_string()));
        }
        3 => {
            props.insert("top".into(), json!(top));
        }
        _ => {}
    }
}

fn write_collection(path: &str, features: Vec<Value>) {
    let count = features.len();
    let collection = json!({ "type": "FeatureCollection", "features": features });
    let text = serde_json::to_string_pretty(&collection).expect("Failed to serialize collection");
    std::fs::write(path, text).expect("Failed to write output file");
    println!("Wrote {count} advisories to {path}");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let now = Utc::now();

    let sigmet_hazards = ["TURB", "ICE", "TS", "VA", "MTW"];
    let air_hazards = ["CONVECTIVE", "IFR", "MT_OBSC", "TURB", "ICE"];

    let mut sigmets = Vec::new();
    for i in 0..18 {
        let hazard = *rng.pick(&sigmet_hazards);
        let floor = (rng.range(0.0, 30.0).round()) * 1000.0;
        let top = floor + (rng.range(4.0, 18.0).round()) * 1000.0;
        let start = now + Duration::hours(rng.range(-26.0, 4.0).round() as i64);
        let end = start + Duration::hours(4);

        let mut props = Map::new();
        props.insert("hazard".into(), json!(hazard));
        props.insert("validTimeFrom".into(), json!(iso(start)));
        props.insert("validTimeTo".into(), json!(iso(end)));
        props.insert("rawSigmet".into(), json!(format!("SIGMET {hazard} {i:02} VALID {} FL{:03}/{:03}", iso(start), floor / 100.0, top / 100.0)));
        put_altitudes(&mut rng, &mut props, floor, top);

        let geometry = if i == 7 {
            Value::Null
        } else {
            let lon = rng.range(-125.0, -68.0);
            let lat = rng.range(25.0, 49.0);
            let radius = rng.range(1.5, 4.0);
            blob(&mut rng, lon, lat, radius)
        };
        sigmets.push(json!({ "type": "Feature", "geometry": geometry, "properties": props }));
    }

    let mut air_sigmets = Vec::new();
    for i in 0..12 {
        let hazard = *rng.pick(&air_hazards);
        let floor = (rng.range(0.0, 20.0).round()) * 1000.0;
        let top = floor + (rng.range(2.0, 15.0).round()) * 1000.0;
        let start = now + Duration::hours(rng.range(-20.0, 2.0).round() as i64);

        let mut props = Map::new();
        props.insert("hazard".into(), json!(hazard));
        props.insert("valid_time_from".into(), json!(iso(start)));
        // every fourth advisory has no end time: always valid
        if i % 4 != 0 {
            props.insert("valid_time_to".into(), json!(iso(start + Duration::hours(6))));
        }
        put_altitudes(&mut rng, &mut props, floor, top);

        let lon = rng.range(-120.0, -72.0);
        let lat = rng.range(28.0, 46.0);
        let radius = rng.range(1.0, 3.0);
        let geometry = blob(&mut rng, lon, lat, radius);
        air_sigmets.push(json!({ "type": "Feature", "geometry": geometry, "properties": props }));
    }

    write_collection("sample_sigmet.geojson", sigmets);
    write_collection("sample_airsigmet.geojson", air_sigmets);
}
