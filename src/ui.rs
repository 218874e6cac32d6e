use crate::calendar::CalendarDate;
use crate::series::SERIES;

/// Dashboard page. `today` only seeds the first paint; the page re-reads the
/// viewer's local date every minute and sends it with each request.
pub fn render_index(today: CalendarDate) -> String {
    let legend: String = SERIES
        .iter()
        .map(|series| {
            format!(
                r#"<span class="key"><i style="background:{}"></i>{}</span>"#,
                series.color, series.label
            )
        })
        .collect();

    INDEX_HTML
        .replace("{{TODAY}}", &today.to_string())
        .replace("{{LEGEND}}", &legend)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Media Server Dashboard</title>
  <style>
    :root {
      --bg: #0f172a;
      --card: #1e293b;
      --ink: #e2e8f0;
      --muted: #94a3b8;
      --accent: #38bdf8;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 28px 18px 48px;
    }

    main {
      width: min(980px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    section {
      background: var(--card);
      border-radius: 14px;
      padding: 20px;
    }

    h1, h2 {
      margin: 0 0 12px;
    }

    .controls {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    select, input, button {
      background: #0b1220;
      color: var(--ink);
      border: 1px solid #334155;
      border-radius: 8px;
      padding: 6px 10px;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 14px;
      margin: 12px 0;
      color: var(--muted);
      font-size: 0.85rem;
    }

    .key i {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 2px;
      margin-right: 6px;
    }

    #chart {
      width: 100%;
      height: 240px;
    }

    .placeholder {
      color: var(--muted);
      text-align: center;
      padding: 60px 0;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
    }

    li {
      display: flex;
      justify-content: space-between;
      padding: 8px 0;
      border-bottom: 1px solid #334155;
    }

    .recent {
      color: var(--accent);
    }
  </style>
</head>
<body>
  <main>
    <h1>Media Server Dashboard</h1>

    <section>
      <h2>Plays by day</h2>
      <div class="controls">
        <select id="days">
          <option value="7">Last 7 days</option>
          <option value="30" selected>Last 30 days</option>
          <option value="90">Last 90 days</option>
          <option value="all">All time</option>
        </select>
        <input type="date" id="start" />
        <input type="date" id="end" />
        <button id="apply">Custom range</button>
        <span id="range" data-today="{{TODAY}}"></span>
      </div>
      <div class="legend">{{LEGEND}}</div>
      <div id="plays"></div>
    </section>

    <section>
      <h2>Login locations</h2>
      <ul id="locations"></ul>
    </section>
  </main>

  <script>
    const rangeEl = document.getElementById('range');
    let today = rangeEl.dataset.today;
    let custom = null;

    function localToday() {
      const now = new Date();
      const pad = (n) => String(n).padStart(2, '0');
      return `${now.getFullYear()}-${pad(now.getMonth() + 1)}-${pad(now.getDate())}`;
    }

    function query() {
      const params = new URLSearchParams({ days: document.getElementById('days').value, today });
      if (custom) {
        params.set('start', custom.start);
        params.set('end', custom.end);
      }
      return params.toString();
    }

    function drawChart(chart) {
      const target = document.getElementById('plays');
      rangeEl.textContent = `${chart.range.start} to ${chart.range.end}`;
      if (!chart.has_data) {
        target.replaceChildren(placeholder('No plays in this period'));
        return;
      }
      const days = chart.ticks.length;
      const totals = chart.ticks.map((_, i) => chart.series.reduce((sum, s) => sum + s.values[i], 0));
      const max = Math.max(...totals, 1);
      const width = 100 / days;
      const svgNs = 'http://www.w3.org/2000/svg';
      const svg = document.createElementNS(svgNs, 'svg');
      svg.id = 'chart';
      svg.setAttribute('viewBox', '0 0 100 100');
      svg.setAttribute('preserveAspectRatio', 'none');
      chart.ticks.forEach((tick, i) => {
        let y = 100;
        chart.series.forEach((s) => {
          const h = (s.values[i] / max) * 100;
          y -= h;
          const rect = document.createElementNS(svgNs, 'rect');
          rect.setAttribute('x', i * width);
          rect.setAttribute('y', y);
          rect.setAttribute('width', width * 0.8);
          rect.setAttribute('height', h);
          rect.setAttribute('fill', s.color);
          const title = document.createElementNS(svgNs, 'title');
          title.textContent = `${tick.label}: ${s.label} ${s.values[i]}`;
          rect.append(title);
          svg.append(rect);
        });
      });
      target.replaceChildren(svg);
    }

    function placeholder(text) {
      const div = document.createElement('div');
      div.className = 'placeholder';
      div.textContent = text;
      return div;
    }

    function drawLocations(payload) {
      const list = document.getElementById('locations');
      list.replaceChildren(...payload.locations.map((l) => {
        const item = document.createElement('li');
        const where = document.createElement('span');
        where.textContent = `${l.ip} \u00b7 ${l.label}`;
        const seen = document.createElement('span');
        seen.textContent = l.seen;
        if (l.recent) {
          seen.className = 'recent';
        }
        item.append(where, seen);
        return item;
      }));
    }

    async function refresh() {
      const plays = await fetch(`/api/plays?${query()}`);
      if (plays.ok) {
        drawChart(await plays.json());
      } else {
        document.getElementById('plays').replaceChildren(placeholder(await plays.text()));
      }
      const locations = await fetch('/api/locations');
      if (locations.ok) {
        drawLocations(await locations.json());
      }
    }

    document.getElementById('days').addEventListener('change', () => {
      custom = null;
      refresh();
    });
    document.getElementById('apply').addEventListener('click', () => {
      const start = document.getElementById('start').value;
      const end = document.getElementById('end').value;
      if (start && end) {
        custom = { start, end };
        refresh();
      }
    });

    setInterval(() => {
      const current = localToday();
      if (current !== today) {
        today = current;
        refresh();
      }
    }, 60000);

    today = localToday();
    refresh();
  </script>
</body>
</html>
"#;
