use contracts::dashboards::d400_seller_performance::{
    InsightKind, InsightPriority, SellerInsight, SellerMetrics,
};

const MAX_INSIGHTS: usize = 3;

fn insight(kind: InsightKind, priority: InsightPriority, message: &str) -> SellerInsight {
    SellerInsight {
        kind,
        priority,
        message: message.to_string(),
    }
}

/// Отклонение от среднего в процентах, 0 при нулевом среднем
fn distance_from_average(current: f64, average: f64) -> f64 {
    if average > 0.0 {
        (current - average) / average * 100.0
    } else {
        0.0
    }
}

/// Подсказки для карточки продавца: не более трёх, сначала высокий приоритет
pub fn build_insights(m: &SellerMetrics) -> Vec<SellerInsight> {
    use InsightKind::*;
    use InsightPriority::*;

    let revenue_vs_average =
        distance_from_average(m.current_period_revenue, m.historical_average_revenue);
    let orders_vs_average = distance_from_average(
        m.current_period_orders as f64,
        m.historical_average_orders,
    );
    let portfolio = m.portfolio_size as f64;
    let active = m.active_customer_count as f64;

    let mut out = Vec::new();

    // Возможности
    if m.revenue_variation_pct > 20.0 {
        out.push(insight(
            Opportunity,
            High,
            "Faturamento em alta! Aproveite para expandir a carteira.",
        ));
    }
    if revenue_vs_average > 20.0 && m.orders_variation_pct > 0.0 {
        out.push(insight(
            Opportunity,
            High,
            "Faturamento acima da média histórica com crescimento de pedidos. Ótimo desempenho!",
        ));
    }
    if orders_vs_average > 20.0 && m.orders_variation_pct > 0.0 {
        out.push(insight(
            Opportunity,
            Medium,
            "Pedidos acima da média histórica com crescimento. Ótimo desempenho!",
        ));
    }

    // Предупреждения
    if m.revenue_variation_pct < -15.0 {
        out.push(insight(
            Alert,
            High,
            "Faturamento em queda. Revisar estratégia de vendas.",
        ));
    }
    if revenue_vs_average < -20.0 {
        out.push(insight(
            Alert,
            High,
            "Faturamento abaixo da média histórica. Revisar estratégia de vendas.",
        ));
    }
    if m.orders_variation_pct < -20.0 {
        out.push(insight(
            Alert,
            High,
            "Queda significativa no número de pedidos. Reativar clientes.",
        ));
    }
    if active < portfolio * 0.3 {
        out.push(insight(
            Alert,
            High,
            "Baixa taxa de clientes ativos. Priorizar reativação.",
        ));
    }
    if orders_vs_average < -20.0 {
        out.push(insight(
            Alert,
            High,
            "Pedidos abaixo da média histórica. Revisar estratégia de vendas.",
        ));
    }

    // Рекомендации
    if m.current_period_revenue > 0.0 && m.orders_variation_pct > 0.0 && revenue_vs_average < 0.0
    {
        out.push(insight(
            Recommendation,
            Medium,
            "Aumentar faturamento focando em produtos de maior valor para alcançar a média histórica.",
        ));
    }
    if portfolio > 0.0 && active < portfolio * 0.4 {
        out.push(insight(
            Recommendation,
            High,
            "Criar campanha de reativação para clientes inativos.",
        ));
    }
    if m.historical_average_orders > 0.0
        && (m.current_period_orders as f64) < m.historical_average_orders * 0.8
    {
        out.push(insight(
            Recommendation,
            Medium,
            "Aumentar volume de pedidos para alcançar a média histórica.",
        ));
    }

    if out.is_empty() {
        return vec![insight(
            Neutral,
            Low,
            "Performance estável. Mantenha o foco!",
        )];
    }

    // sort_by is stable: rule order is kept within a priority
    out.sort_by(|a, b| b.priority.cmp(&a.priority));
    out.truncate(MAX_INSIGHTS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SellerMetrics {
        SellerMetrics {
            current_period_revenue: 1000.0,
            prior_period_revenue: 1000.0,
            revenue_variation_pct: 0.0,
            historical_average_revenue: 1000.0,
            current_period_orders: 10,
            prior_period_orders: 10,
            orders_variation_pct: 0.0,
            historical_average_orders: 10.0,
            portfolio_size: 10,
            active_customer_count: 8,
        }
    }

    #[test]
    fn test_stable_performance() {
        let out = build_insights(&base());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, InsightKind::Neutral);
        assert_eq!(out[0].message, "Performance estável. Mantenha o foco!");
    }

    #[test]
    fn test_zeroed_metrics_are_stable() {
        // portfolio 0: 0 < 0 is false for every ratio rule
        let out = build_insights(&SellerMetrics::zeroed());
        assert_eq!(out[0].kind, InsightKind::Neutral);
    }

    #[test]
    fn test_growth_is_an_opportunity() {
        let m = SellerMetrics {
            current_period_revenue: 1500.0,
            revenue_variation_pct: 50.0,
            current_period_orders: 15,
            orders_variation_pct: 50.0,
            ..base()
        };
        let out = build_insights(&m);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|i| i.kind == InsightKind::Opportunity));
        assert_eq!(out[0].priority, InsightPriority::High);
        assert_eq!(out[2].priority, InsightPriority::Medium);
    }

    #[test]
    fn test_high_priority_first_and_truncated() {
        let m = SellerMetrics {
            current_period_revenue: 500.0,
            revenue_variation_pct: -50.0,
            current_period_orders: 5,
            orders_variation_pct: -50.0,
            active_customer_count: 1,
            ..base()
        };
        let out = build_insights(&m);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|i| i.priority == InsightPriority::High));
        assert_eq!(
            out[0].message,
            "Faturamento em queda. Revisar estratégia de vendas."
        );
        assert_eq!(out[1].kind, InsightKind::Alert);
    }

    #[test]
    fn test_low_activity_recommendation() {
        let m = SellerMetrics {
            active_customer_count: 3,
            ..base()
        };
        let out = build_insights(&m);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, InsightKind::Recommendation);
        assert_eq!(out[0].priority, InsightPriority::High);
    }

    #[test]
    fn test_orders_below_average_recommendation() {
        let m = SellerMetrics {
            current_period_orders: 8,
            historical_average_orders: 10.5,
            ..base()
        };
        let out = build_insights(&m);
        // -23.8% vs average: alert (high) first, then recommendation (medium)
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, InsightKind::Alert);
        assert_eq!(
            out[1].message,
            "Aumentar volume de pedidos para alcançar a média histórica."
        );
    }
}
