use handlebars::Handlebars;
use serde_json::json;

use crate::models::AnalyzedReview;

use super::ReportStats;

/// 周报 HTML 模板：总摘要 + 运营商柱状图 + Top 问题榜 + 评论明细表
///
/// 图表用纯 CSS 条形渲染，邮件客户端不执行脚本，也显示不了外链图。
const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body { font-family: "Helvetica Neue", Arial, sans-serif; color: #333; margin: 0; padding: 24px; background: #f5f5f5; }
  .card { background: #fff; border-radius: 8px; padding: 20px; margin-bottom: 16px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
  h1 { font-size: 20px; margin: 0 0 4px; }
  h2 { font-size: 16px; border-bottom: 2px solid #eee; padding-bottom: 6px; }
  .meta { color: #888; font-size: 12px; }
  .bar-row { margin: 8px 0; }
  .bar-label { font-size: 13px; margin-bottom: 2px; }
  .bar-track { background: #eee; border-radius: 4px; overflow: hidden; }
  .bar-fill { height: 18px; border-radius: 4px; color: #fff; font-size: 12px; line-height: 18px; padding-left: 6px; min-width: 24px; }
  table { border-collapse: collapse; width: 100%; font-size: 12px; }
  th, td { border: 1px solid #e0e0e0; padding: 6px 8px; text-align: left; vertical-align: top; }
  th { background: #fafafa; }
  .neg { color: #D32F2F; font-weight: bold; }
  .pos { color: #388E3C; font-weight: bold; }
</style>
</head>
<body>
<div class="card">
  <h1>电信运营商评论周报</h1>
  <div class="meta">{{generated_at}} | 共 {{stats.total}} 条评论{{#if stats.failed_count}} | 分类失败 {{stats.failed_count}} 条{{/if}}</div>
</div>

<div class="card">
  <h2>市场总评</h2>
  {{{overview}}}
</div>

<div class="card">
  <h2>各运营商评论量</h2>
  {{#each stats.per_operator}}
  <div class="bar-row">
    <div class="bar-label">{{name}}（{{total}} 条，负面 {{negative}}）</div>
    <div class="bar-track">
      <div class="bar-fill" style="width: {{share_pct}}%; background: {{color}};">{{share_pct}}%</div>
    </div>
  </div>
  {{/each}}
</div>

{{#if stats.top_negative_issues}}
<div class="card">
  <h2>Top 负面问题</h2>
  <table>
    <tr><th>问题</th><th>次数</th></tr>
    {{#each stats.top_negative_issues}}
    <tr><td>{{issue}}</td><td>{{count}}</td></tr>
    {{/each}}
  </table>
</div>
{{/if}}

<div class="card">
  <h2>评论明细</h2>
  <table>
    <tr><th>运营商</th><th>分类</th><th>问题</th><th>业务</th><th>情感</th><th>摘要</th></tr>
    {{#each reviews}}
    <tr>
      <td>{{operator}}</td>
      <td>{{category}}</td>
      <td>{{issue}}</td>
      <td>{{service_type}}</td>
      <td class="{{sentiment_class}}">{{sentiment}}</td>
      <td><a href="{{url}}">{{summary}}</a></td>
    </tr>
    {{/each}}
  </table>
</div>
</body>
</html>"#;

/// 渲染完整周报 HTML
pub fn render_report(
    stats: &ReportStats,
    overview_html: &str,
    reviews: &[AnalyzedReview],
) -> anyhow::Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_template_string("report", REPORT_TEMPLATE)?;

    let review_rows: Vec<serde_json::Value> = reviews
        .iter()
        .map(|review| {
            json!({
                "operator": review.record.operator,
                "category": review.analysis.l1_category.as_str(),
                "issue": review.analysis.l2_issue,
                "service_type": review.analysis.service_type.as_str(),
                "sentiment": review.analysis.sentiment.as_str(),
                "sentiment_class": match review.analysis.sentiment.as_str() {
                    "Negative" => "neg",
                    "Positive" => "pos",
                    _ => "",
                },
                "summary": review.analysis.summary,
                "url": review.record.url,
            })
        })
        .collect();

    let context = json!({
        "generated_at": chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        "stats": stats,
        "overview": overview_html,
        "reviews": review_rows,
    });

    Ok(handlebars.render("report", &context)?)
}
