mod token_store_tests;
