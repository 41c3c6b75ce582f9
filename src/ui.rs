use crate::models::{is_retroactive, CheckinStats, CheckinStore, TOTAL_DAYS};
use std::fmt::Write as _;

pub fn render_index(store: &CheckinStore, stats: &CheckinStats) -> String {
    INDEX_HTML
        .replace("{{DAYS}}", &render_days(store))
        .replace("{{CHECKED}}", &stats.checked_days.to_string())
        .replace("{{TOTAL}}", &stats.total_days.to_string())
        .replace("{{REMAINING}}", &stats.remaining_days.to_string())
        .replace("{{PROGRESS}}", &format!("{:.1}", stats.progress_percentage))
        .replace("{{WEEK1}}", &format!("{:.0}", stats.week_progress.week1))
        .replace("{{WEEK2}}", &format!("{:.0}", stats.week_progress.week2))
        .replace("{{WEEK3}}", &format!("{:.0}", stats.week_progress.week3))
}

fn render_days(store: &CheckinStore) -> String {
    let mut html = String::new();
    for day in 1..=TOTAL_DAYS {
        let class = match store.get(&day.to_string()) {
            Some(record) if is_retroactive(record) => "day checked retro",
            Some(_) => "day checked",
            None => "day",
        };
        let _ = writeln!(html, r#"        <li class="{class}" data-day="{day}">{day}</li>"#);
    }
    html
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>21-Day Check-in</title>
  <style>
    body { margin: 0; padding: 32px 16px; font-family: sans-serif; background: #f8f3e6; color: #2b2a28; }
    main { max-width: 640px; margin: 0 auto; display: grid; gap: 20px; }
    .panel { display: flex; flex-wrap: wrap; gap: 16px; }
    .label { display: block; font-size: 0.8rem; text-transform: uppercase; color: #8b857d; }
    .days { list-style: none; padding: 0; margin: 0; display: grid; grid-template-columns: repeat(7, 1fr); gap: 6px; }
    .day { background: white; border-radius: 8px; padding: 10px 0; text-align: center; }
    .day.checked { background: #ff6b4a; color: white; }
    .day.retro { background: #2f4858; }
    .status[data-type="error"] { color: #c63b2b; }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>21-Day Check-in</h1>
    </header>

    <section class="panel">
      <div class="stat"><span class="label">Checked</span><span class="value">{{CHECKED}} / {{TOTAL}}</span></div>
      <div class="stat"><span class="label">Remaining</span><span class="value">{{REMAINING}}</span></div>
      <div class="stat"><span class="label">Progress</span><span class="value">{{PROGRESS}}%</span></div>
      <div class="stat"><span class="label">Weeks</span><span class="value">{{WEEK1}}% · {{WEEK2}}% · {{WEEK3}}%</span></div>
    </section>

    <ul class="days">
{{DAYS}}    </ul>

    <form id="checkin-form">
      <input id="checkin-day" type="number" min="1" max="21" placeholder="Day" required />
      <button type="submit">Check in</button>
    </form>

    <form id="retro-form">
      <input id="retro-day" type="number" min="1" max="21" placeholder="Missed day" required />
      <input id="retro-password" type="password" placeholder="Password" required />
      <button type="submit">Retroactive check-in</button>
    </form>

    <div class="status" id="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');

    const setStatus = (text, type) => {
      statusEl.textContent = text;
      statusEl.dataset.type = type;
    };

    const post = async (url, body) => {
      const res = await fetch(url, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ ...body, timestamp: Date.now() })
      });
      const payload = await res.json().catch(() => ({}));
      if (!res.ok) {
        throw new Error(payload.message || 'Request failed');
      }
      setStatus(payload.message, 'ok');
      setTimeout(() => window.location.reload(), 600);
    };

    document.getElementById('checkin-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const date = document.getElementById('checkin-day').value;
      post('/api/checkin', { date }).catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('retro-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const date = document.getElementById('retro-day').value;
      const password = document.getElementById('retro-password').value;
      post('/api/checkin/retroactive', { date, password })
        .catch((err) => setStatus(err.message, 'error'));
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::stats::build_stats;

    #[test]
    fn index_marks_checked_and_retroactive_days() {
        let mut store = CheckinStore::new();
        store.insert("2".to_string(), json!({ "date": "2", "timestamp": 0 }));
        store.insert("5".to_string(), json!({ "date": "5", "is_retroactive": true }));

        let html = render_index(&store, &build_stats(&store));

        assert!(html.contains(r#"<li class="day checked" data-day="2">2</li>"#));
        assert!(html.contains(r#"<li class="day checked retro" data-day="5">5</li>"#));
        assert!(html.contains(r#"<li class="day" data-day="21">21</li>"#));
        assert!(html.contains("2 / 21"));
        assert!(!html.contains("{{"));
    }
}
